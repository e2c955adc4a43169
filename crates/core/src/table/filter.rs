//! Filter pipeline: independent predicates applied as a conjunction.
//!
//! Each criterion reports whether it is a no-op; no-op criteria are skipped
//! entirely, the rest run as sequential retain passes over the subset.

use std::collections::BTreeSet;

use crate::models::{CollectionItem, Currency, CurrencyType, Territory, TerritoryType};

/// Inclusive optional year bounds.
///
/// A range with `from > to` is invalid and is never applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterDates {
    /// Lower bound, inclusive.
    pub from: Option<i32>,
    /// Upper bound, inclusive.
    pub to: Option<i32>,
}

impl FilterDates {
    /// Build a range from optional bounds.
    pub fn new(from: Option<i32>, to: Option<i32>) -> Self {
        Self { from, to }
    }

    /// Whether the bounds are consistent.
    pub fn is_valid(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }

    /// Whether applying the range could remove anything.
    pub fn is_noop(&self) -> bool {
        (self.from.is_none() && self.to.is_none()) || !self.is_valid()
    }

    /// Whether `value` lies inside the range. An absent value never matches.
    pub fn contains(&self, value: Option<i32>) -> bool {
        let Some(value) = value else {
            return false;
        };
        self.from.map_or(true, |from| value >= from) && self.to.map_or(true, |to| value <= to)
    }
}

/// A single predicate of the pipeline.
pub trait Criterion<R> {
    /// Whether the criterion would keep every record.
    fn is_noop(&self) -> bool;

    /// Whether `record` passes.
    fn matches(&self, record: &R) -> bool;
}

/// Keep records of one continent; `None` keeps all.
pub struct ContinentCriterion<R> {
    continent: Option<u32>,
    accessor: fn(&R) -> u32,
}

impl<R> ContinentCriterion<R> {
    /// Filter on the continent id returned by `accessor`.
    pub fn new(continent: Option<u32>, accessor: fn(&R) -> u32) -> Self {
        Self {
            continent,
            accessor,
        }
    }
}

impl<R> Criterion<R> for ContinentCriterion<R> {
    fn is_noop(&self) -> bool {
        self.continent.is_none()
    }

    fn matches(&self, record: &R) -> bool {
        self.continent == Some((self.accessor)(record))
    }
}

/// Keep records whose type is in an allow-list.
pub struct TypeCriterion<R, T: 'static> {
    allowed: BTreeSet<T>,
    all: &'static [T],
    accessor: fn(&R) -> T,
}

impl<R, T: Ord + Copy + 'static> TypeCriterion<R, T> {
    /// `all` is the complete type set; an allow-list covering it is a no-op.
    pub fn new(allowed: BTreeSet<T>, all: &'static [T], accessor: fn(&R) -> T) -> Self {
        Self {
            allowed,
            all,
            accessor,
        }
    }
}

impl<R, T: Ord + Copy + 'static> Criterion<R> for TypeCriterion<R, T> {
    fn is_noop(&self) -> bool {
        self.all.iter().all(|kind| self.allowed.contains(kind))
    }

    fn matches(&self, record: &R) -> bool {
        self.allowed.contains(&(self.accessor)(record))
    }
}

/// Keep existing and/or extinct records, decided by end-year presence.
pub struct LifecycleCriterion<R> {
    existing: bool,
    extinct: bool,
    end: fn(&R) -> Option<i32>,
}

impl<R> LifecycleCriterion<R> {
    /// Both flags false keeps nothing.
    pub fn new(existing: bool, extinct: bool, end: fn(&R) -> Option<i32>) -> Self {
        Self {
            existing,
            extinct,
            end,
        }
    }
}

impl<R> Criterion<R> for LifecycleCriterion<R> {
    fn is_noop(&self) -> bool {
        self.existing && self.extinct
    }

    fn matches(&self, record: &R) -> bool {
        match (self.end)(record) {
            None => self.existing,
            Some(_) => self.extinct,
        }
    }
}

/// Keep records whose year field falls in a [`FilterDates`] range.
pub struct DateCriterion<R> {
    dates: FilterDates,
    accessor: fn(&R) -> Option<i32>,
}

impl<R> DateCriterion<R> {
    /// Filter on the year returned by `accessor`.
    pub fn new(dates: FilterDates, accessor: fn(&R) -> Option<i32>) -> Self {
        Self { dates, accessor }
    }
}

impl<R> Criterion<R> for DateCriterion<R> {
    fn is_noop(&self) -> bool {
        self.dates.is_noop()
    }

    fn matches(&self, record: &R) -> bool {
        self.dates.contains((self.accessor)(record))
    }
}

/// Ordered set of criteria applied as a conjunction.
pub struct FilterSet<R> {
    criteria: Vec<Box<dyn Criterion<R>>>,
}

impl<R> Default for FilterSet<R> {
    fn default() -> Self {
        Self {
            criteria: Vec::new(),
        }
    }
}

impl<R> FilterSet<R> {
    /// Empty set; keeps every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a criterion.
    pub fn with(mut self, criterion: impl Criterion<R> + 'static) -> Self {
        self.criteria.push(Box::new(criterion));
        self
    }

    /// Whether every criterion is a no-op.
    pub fn is_noop(&self) -> bool {
        self.criteria.iter().all(|criterion| criterion.is_noop())
    }

    /// Filter `records`, preserving their order.
    pub fn apply<'r, I>(&self, records: I) -> Vec<&'r R>
    where
        I: IntoIterator<Item = &'r R>,
        R: 'r,
    {
        let mut subset: Vec<&'r R> = records.into_iter().collect();
        for criterion in self.criteria.iter().filter(|criterion| !criterion.is_noop()) {
            subset.retain(|record| criterion.matches(record));
        }
        subset
    }
}

/// Filter bundle for a record kind.
pub trait RecordFilter<R> {
    /// Build the criteria for the current selection.
    fn criteria(&self) -> FilterSet<R>;
}

/// Filter selection for the territory table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryFilter {
    /// Continent id, `None` for all.
    pub continent: Option<u32>,
    /// Allowed territory types.
    pub types: BTreeSet<TerritoryType>,
    /// Keep territories that still exist.
    pub existing: bool,
    /// Keep territories that no longer exist.
    pub extinct: bool,
    /// Range on the founding year.
    pub founded: FilterDates,
    /// Range on the end year.
    pub ended: FilterDates,
}

impl Default for TerritoryFilter {
    fn default() -> Self {
        Self {
            continent: None,
            types: TerritoryType::ALL.into_iter().collect(),
            existing: true,
            extinct: true,
            founded: FilterDates::default(),
            ended: FilterDates::default(),
        }
    }
}

impl RecordFilter<Territory> for TerritoryFilter {
    fn criteria(&self) -> FilterSet<Territory> {
        FilterSet::new()
            .with(ContinentCriterion::new(self.continent, |t: &Territory| t.continent.id))
            .with(TypeCriterion::new(
                self.types.clone(),
                &TerritoryType::ALL,
                |t: &Territory| t.territory_type,
            ))
            .with(LifecycleCriterion::new(self.existing, self.extinct, |t: &Territory| t.end))
            .with(DateCriterion::new(self.founded, |t: &Territory| Some(t.start)))
            .with(DateCriterion::new(self.ended, |t: &Territory| t.end))
    }
}

/// Filter selection for the currency table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFilter {
    /// Continent id, `None` for all.
    pub continent: Option<u32>,
    /// Allowed currency types.
    pub types: BTreeSet<CurrencyType>,
    /// Keep currencies still in circulation.
    pub existing: bool,
    /// Keep withdrawn currencies.
    pub extinct: bool,
    /// Range on the introduction year.
    pub introduced: FilterDates,
    /// Range on the withdrawal year.
    pub withdrawn: FilterDates,
}

impl Default for CurrencyFilter {
    fn default() -> Self {
        Self {
            continent: None,
            types: CurrencyType::ALL.into_iter().collect(),
            existing: true,
            extinct: true,
            introduced: FilterDates::default(),
            withdrawn: FilterDates::default(),
        }
    }
}

impl RecordFilter<Currency> for CurrencyFilter {
    fn criteria(&self) -> FilterSet<Currency> {
        FilterSet::new()
            .with(ContinentCriterion::new(self.continent, |c: &Currency| c.continent_id))
            .with(TypeCriterion::new(
                self.types.clone(),
                &CurrencyType::ALL,
                |c: &Currency| c.currency_type,
            ))
            .with(LifecycleCriterion::new(self.existing, self.extinct, |c: &Currency| c.end))
            .with(DateCriterion::new(self.introduced, |c: &Currency| Some(c.start)))
            .with(DateCriterion::new(self.withdrawn, |c: &Currency| c.end))
    }
}

/// Filter selection for the collection table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionFilter {
    /// Continent id, `None` for all.
    pub continent: Option<u32>,
}

impl RecordFilter<CollectionItem> for CollectionFilter {
    fn criteria(&self) -> FilterSet<CollectionItem> {
        FilterSet::new().with(ContinentCriterion::new(
            self.continent,
            |item: &CollectionItem| item.continent_id,
        ))
    }
}

/// Selection for tables without client-side filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFilter;

impl<R> RecordFilter<R> for NoFilter {
    fn criteria(&self) -> FilterSet<R> {
        FilterSet::new()
    }
}

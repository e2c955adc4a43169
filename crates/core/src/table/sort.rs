//! Comparator construction from field accessor tables.
//!
//! Every record kind maps each of its fields to an [`Accessor`]: either a
//! plain key extractor or a statistics metric resolved through a
//! [`StatsSource`]. One generic comparator then serves every table.

use std::{cmp::Ordering, fmt::Debug, hash::Hash};

use super::stats::{Metric, StatsScope, StatsSource};

/// Sort direction for the active column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Orient an ascending ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// A comparable key extracted from a record.
///
/// Absent optional values order after every present value, so an
/// open-ended period (no end year) ranks as the latest.
#[derive(Debug, Clone, Copy)]
pub enum SortValue<'a> {
    /// Lexical, locale-naive.
    Text(&'a str),
    /// Lexical; absent last.
    OptText(Option<&'a str>),
    /// Numeric.
    Int(i64),
    /// Numeric; absent ranks as the maximum value.
    OptInt(Option<i64>),
    /// Numeric, total order.
    Float(f64),
    /// Numeric, total order; absent last.
    OptFloat(Option<f64>),
}

impl SortValue<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Text(_) => 0,
            SortValue::OptText(_) => 1,
            SortValue::Int(_) => 2,
            SortValue::OptInt(_) => 3,
            SortValue::Float(_) => 4,
            SortValue::OptFloat(_) => 5,
        }
    }
}

fn absent_last<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Ord for SortValue<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::OptText(a), SortValue::OptText(b)) => absent_last(*a, *b, |a, b| a.cmp(b)),
            (SortValue::Int(a), SortValue::Int(b)) => a.cmp(b),
            (SortValue::OptInt(a), SortValue::OptInt(b)) => {
                a.unwrap_or(i64::MAX).cmp(&b.unwrap_or(i64::MAX))
            }
            (SortValue::Float(a), SortValue::Float(b)) => a.total_cmp(b),
            (SortValue::OptFloat(a), SortValue::OptFloat(b)) => {
                absent_last(*a, *b, |a, b| a.total_cmp(&b))
            }
            // Keys of one field always share a variant.
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortValue<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue<'_> {}

/// How a field's ordering key is obtained.
pub enum Accessor<R> {
    /// Key read directly from the record.
    Key(fn(&R) -> SortValue<'_>),
    /// Metric read from the record's statistic block.
    Stat(Metric),
}

/// A record kind that can be ordered by its own closed set of fields.
pub trait Sortable: Sized {
    /// Fields of this record kind.
    type Field: Copy + Eq + Hash + Debug;

    /// Identifier used to join statistic blocks.
    fn id(&self) -> u32;

    /// Accessor table entry for `field`.
    fn accessor(field: Self::Field) -> Accessor<Self>;
}

/// The active ordering of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    /// Field to order by.
    pub field: F,
    /// Direction.
    pub direction: SortDirection,
    /// Statistics scope, used only by statistics fields. Defaults to catalog.
    pub scope: Option<StatsScope>,
}

impl<F> SortSpec<F> {
    /// Ascending order on a plain field.
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
            scope: None,
        }
    }

    /// Descending order on a plain field.
    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
            scope: None,
        }
    }

    /// Attach a statistics scope.
    pub fn with_scope(mut self, scope: StatsScope) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// Ordering key of `record` for `field`.
pub fn sort_key<'a, R: Sortable>(
    record: &'a R,
    field: R::Field,
    scope: Option<StatsScope>,
    stats: StatsSource<'_>,
) -> SortValue<'a> {
    match R::accessor(field) {
        Accessor::Key(key) => key(record),
        Accessor::Stat(metric) => {
            stats.sort_value(scope.unwrap_or(StatsScope::Catalog), record.id(), metric)
        }
    }
}

/// Compare two records under `spec`.
pub fn compare<R: Sortable>(
    a: &R,
    b: &R,
    spec: &SortSpec<R::Field>,
    stats: StatsSource<'_>,
) -> Ordering {
    let left = sort_key(a, spec.field, spec.scope, stats);
    let right = sort_key(b, spec.field, spec.scope, stats);
    spec.direction.apply(left.cmp(&right))
}

/// Stable in-place sort; ties keep their prior relative order.
pub fn sort_records<R: Sortable>(records: &mut [R], spec: &SortSpec<R::Field>, stats: StatsSource<'_>) {
    records.sort_by(|a, b| compare(a, b, spec, stats));
}

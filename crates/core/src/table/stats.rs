//! Statistics lookup joined to records by id at read time.

use std::{collections::HashMap, sync::Arc};

use once_cell::sync::Lazy;

use crate::models::{StatisticBlock, StatsRecord};

use super::{format::format_number, projection::Cell, sort::SortValue};

/// Which statistics source a metric is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsScope {
    /// Global reference data.
    Catalog,
    /// The user's own collection.
    Collection,
}

impl StatsScope {
    /// Both scopes, catalog first.
    pub const ALL: [StatsScope; 2] = [StatsScope::Catalog, StatsScope::Collection];
}

/// A counter within a [`StatisticBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Number of currencies.
    Currencies,
    /// Number of issue series.
    Issues,
    /// Number of distinct denominations.
    Denominations,
    /// Number of note types.
    Notes,
    /// Number of note variants.
    Variants,
    /// Summed price.
    Price,
}

impl Metric {
    fn count(self, block: &StatisticBlock) -> Option<u32> {
        match self {
            Metric::Currencies => Some(block.currencies),
            Metric::Issues => Some(block.issues),
            Metric::Denominations => Some(block.denominations),
            Metric::Notes => Some(block.notes),
            Metric::Variants => Some(block.variants),
            Metric::Price => None,
        }
    }

    /// Ordering key: a missing block or unknown price counts as zero.
    pub fn sort_value(self, block: Option<&StatisticBlock>) -> SortValue<'static> {
        match self {
            Metric::Price => SortValue::Float(block.and_then(|b| b.price).unwrap_or(0.0)),
            _ => SortValue::Int(block.and_then(|b| self.count(b)).map_or(0, i64::from)),
        }
    }

    /// Display cell: counts default to zero, unknown prices render as a placeholder.
    pub fn cell(self, block: Option<&StatisticBlock>) -> Cell {
        match self {
            Metric::Price => block
                .and_then(|b| b.price)
                .map(|price| Cell::Text(format_number(price)))
                .unwrap_or(Cell::Placeholder),
            _ => Cell::Text(block.and_then(|b| self.count(b)).unwrap_or(0).to_string()),
        }
    }
}

/// Statistic blocks of one scope, indexed by record id.
pub type StatsIndex = HashMap<u32, StatisticBlock>;

static EMPTY_INDEX: Lazy<StatsIndex> = Lazy::new(HashMap::new);

/// Owned statistics for one record kind, both scopes.
///
/// Replacing the tables swaps the `Arc`s; outstanding [`StatsSource`]
/// borrows keep reading the previous snapshot.
#[derive(Debug, Clone, Default)]
pub struct StatsTables {
    catalog: Arc<StatsIndex>,
    collection: Arc<StatsIndex>,
}

impl StatsTables {
    /// Split wire records into the two scope indexes.
    pub fn from_records(records: impl IntoIterator<Item = StatsRecord>) -> Self {
        let mut catalog = HashMap::new();
        let mut collection = HashMap::new();
        for record in records {
            if let Some(block) = record.collection {
                collection.insert(record.id, block);
            }
            catalog.insert(record.id, record.catalog);
        }
        Self {
            catalog: Arc::new(catalog),
            collection: Arc::new(collection),
        }
    }

    /// Borrowing view used by comparators and projection.
    pub fn source(&self) -> StatsSource<'_> {
        StatsSource {
            catalog: &self.catalog,
            collection: &self.collection,
        }
    }
}

/// Read-only view over both scopes of one record kind.
#[derive(Debug, Clone, Copy)]
pub struct StatsSource<'a> {
    catalog: &'a StatsIndex,
    collection: &'a StatsIndex,
}

impl<'a> StatsSource<'a> {
    /// A source with no statistics at all.
    pub fn empty() -> StatsSource<'static> {
        StatsSource {
            catalog: &EMPTY_INDEX,
            collection: &EMPTY_INDEX,
        }
    }

    fn index(&self, scope: StatsScope) -> &'a StatsIndex {
        match scope {
            StatsScope::Catalog => self.catalog,
            StatsScope::Collection => self.collection,
        }
    }

    /// The block for `id` in `scope`, if the snapshot has one.
    pub fn block(&self, scope: StatsScope, id: u32) -> Option<&'a StatisticBlock> {
        self.index(scope).get(&id)
    }

    /// Whether any statistics were loaded for `scope`.
    pub fn has_scope(&self, scope: StatsScope) -> bool {
        !self.index(scope).is_empty()
    }

    /// Ordering key for `metric` of record `id`.
    pub fn sort_value(&self, scope: StatsScope, id: u32, metric: Metric) -> SortValue<'static> {
        metric.sort_value(self.block(scope, id))
    }

    /// Display cell for `metric` of record `id`; an unloaded scope renders as a placeholder.
    pub fn cell(&self, scope: StatsScope, id: u32, metric: Metric) -> Cell {
        if !self.has_scope(scope) {
            return Cell::Placeholder;
        }
        metric.cell(self.block(scope, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> StatsTables {
        StatsTables::from_records(vec![
            StatsRecord {
                id: 1,
                catalog: StatisticBlock {
                    currencies: 3,
                    notes: 40,
                    price: Some(1250.5),
                    ..Default::default()
                },
                collection: Some(StatisticBlock {
                    currencies: 1,
                    notes: 4,
                    ..Default::default()
                }),
            },
            StatsRecord {
                id: 2,
                catalog: StatisticBlock {
                    currencies: 1,
                    ..Default::default()
                },
                collection: None,
            },
        ])
    }

    #[test]
    fn resolves_blocks_per_scope() {
        let tables = tables();
        let source = tables.source();
        assert_eq!(source.block(StatsScope::Catalog, 1).map(|b| b.notes), Some(40));
        assert_eq!(source.block(StatsScope::Collection, 1).map(|b| b.notes), Some(4));
        assert!(source.block(StatsScope::Collection, 2).is_none());
    }

    #[test]
    fn lookup_miss_sorts_as_zero() {
        let tables = tables();
        let source = tables.source();
        assert_eq!(
            source.sort_value(StatsScope::Collection, 2, Metric::Currencies),
            SortValue::Int(0)
        );
        assert_eq!(
            source.sort_value(StatsScope::Collection, 2, Metric::Price),
            SortValue::Float(0.0)
        );
        assert_eq!(
            source.sort_value(StatsScope::Catalog, 99, Metric::Notes),
            SortValue::Int(0)
        );
    }

    #[test]
    fn lookup_miss_renders_zero_count_and_placeholder_price() {
        let tables = tables();
        let source = tables.source();
        assert_eq!(
            source.cell(StatsScope::Collection, 2, Metric::Currencies),
            Cell::Text("0".to_string())
        );
        assert_eq!(source.cell(StatsScope::Collection, 2, Metric::Price), Cell::Placeholder);
        assert_eq!(
            source.cell(StatsScope::Catalog, 1, Metric::Price),
            Cell::Text("1,250.5".to_string())
        );
    }

    #[test]
    fn unloaded_scope_renders_placeholder() {
        let source = StatsSource::empty();
        assert_eq!(source.cell(StatsScope::Catalog, 1, Metric::Notes), Cell::Placeholder);
        assert_eq!(source.sort_value(StatsScope::Catalog, 1, Metric::Notes), SortValue::Int(0));
    }
}

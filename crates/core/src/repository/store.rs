//! Canonical sorted collections shared between the sync task and the UI.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::{
    models::{CollectionItem, Currency, Denomination, IssueYear, StatsRecord, Territory},
    table::{
        columns,
        projection::Project,
        sort::{sort_records, SortSpec},
        stats::StatsTables,
    },
};

/// Every dataset the client loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataKind {
    /// Territory records.
    Territories,
    /// Currency records.
    Currencies,
    /// Denomination records.
    Denominations,
    /// Issue-year records.
    IssueYears,
    /// The collector's items.
    Collection,
    /// Territory statistics.
    TerritoryStats,
    /// Currency statistics.
    CurrencyStats,
    /// Denomination statistics.
    DenominationStats,
    /// Issue-year statistics.
    IssueYearStats,
}

impl DataKind {
    /// Every kind, records first.
    pub const ALL: [DataKind; 9] = [
        DataKind::Territories,
        DataKind::Currencies,
        DataKind::Denominations,
        DataKind::IssueYears,
        DataKind::Collection,
        DataKind::TerritoryStats,
        DataKind::CurrencyStats,
        DataKind::DenominationStats,
        DataKind::IssueYearStats,
    ];

    /// Whether the client is unusable without this kind.
    pub fn is_boot_required(self) -> bool {
        matches!(
            self,
            DataKind::Territories
                | DataKind::Currencies
                | DataKind::TerritoryStats
                | DataKind::CurrencyStats
        )
    }

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            DataKind::Territories => "territories",
            DataKind::Currencies => "currencies",
            DataKind::Denominations => "denominations",
            DataKind::IssueYears => "issue years",
            DataKind::Collection => "collection",
            DataKind::TerritoryStats => "territory stats",
            DataKind::CurrencyStats => "currency stats",
            DataKind::DenominationStats => "denomination stats",
            DataKind::IssueYearStats => "issue year stats",
        }
    }
}

/// Load progress of one dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    /// Not fetched yet.
    #[default]
    Pending,
    /// Fetched successfully.
    Loaded {
        /// Number of records.
        count: usize,
        /// When the dataset was swapped in.
        fetched_at: DateTime<Utc>,
    },
    /// Every attempt failed.
    Failed(String),
    /// Not requested, e.g. no collector session configured.
    Skipped,
}

/// One sorted collection with its statistics.
#[derive(Debug)]
pub struct Table<R: Project> {
    records: Arc<Vec<R>>,
    stats: StatsTables,
    sort: SortSpec<R::Field>,
}

impl<R: Project + Clone> Table<R> {
    fn new(sort: SortSpec<R::Field>) -> Self {
        Self {
            records: Arc::new(Vec::new()),
            stats: StatsTables::default(),
            sort,
        }
    }

    fn resort(&mut self) {
        let mut records = self.records.as_ref().clone();
        sort_records(&mut records, &self.sort, self.stats.source());
        self.records = Arc::new(records);
    }
}

/// All tables held by a [`CatalogStore`].
#[derive(Debug)]
pub struct Tables {
    territories: Table<Territory>,
    currencies: Table<Currency>,
    denominations: Table<Denomination>,
    issue_years: Table<IssueYear>,
    collection: Table<CollectionItem>,
    states: HashMap<DataKind, LoadState>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            territories: Table::new(columns::territory_sort()),
            currencies: Table::new(columns::currency_sort()),
            denominations: Table::new(columns::denomination_sort()),
            issue_years: Table::new(columns::issue_year_sort()),
            collection: Table::new(columns::collection_sort()),
            states: HashMap::new(),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A record kind with a slot in the store.
pub trait Stored: Project + Clone + Send + Sync + sealed::Sealed + 'static {
    /// Dataset holding the records.
    const KIND: DataKind;
    /// Dataset holding their statistics, if the kind has any.
    const STATS: Option<DataKind>;

    #[doc(hidden)]
    fn slot(tables: &Tables) -> &Table<Self>;
    #[doc(hidden)]
    fn slot_mut(tables: &mut Tables) -> &mut Table<Self>;
}

macro_rules! stored {
    ($record:ty, $slot:ident, $kind:expr, $stats:expr) => {
        impl sealed::Sealed for $record {}

        impl Stored for $record {
            const KIND: DataKind = $kind;
            const STATS: Option<DataKind> = $stats;

            fn slot(tables: &Tables) -> &Table<Self> {
                &tables.$slot
            }

            fn slot_mut(tables: &mut Tables) -> &mut Table<Self> {
                &mut tables.$slot
            }
        }
    };
}

stored!(Territory, territories, DataKind::Territories, Some(DataKind::TerritoryStats));
stored!(Currency, currencies, DataKind::Currencies, Some(DataKind::CurrencyStats));
stored!(Denomination, denominations, DataKind::Denominations, Some(DataKind::DenominationStats));
stored!(IssueYear, issue_years, DataKind::IssueYears, Some(DataKind::IssueYearStats));
stored!(CollectionItem, collection, DataKind::Collection, None);

/// Consistent view of one table at a point in time.
#[derive(Debug)]
pub struct Snapshot<R: Project> {
    /// Records in the current sort order.
    pub records: Arc<Vec<R>>,
    /// Statistics joined to the records by id.
    pub stats: StatsTables,
    /// Ordering the records are in.
    pub sort: SortSpec<R::Field>,
}

/// Shared handle to the canonical collections.
///
/// Replacing a collection swaps in a new `Arc`; snapshots taken earlier stay
/// valid and unchanged.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    inner: Arc<RwLock<Tables>>,
}

impl CatalogStore {
    /// Empty store with default orderings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of kind `R` in the current order.
    pub fn records<R: Stored>(&self) -> Arc<Vec<R>> {
        Arc::clone(&R::slot(&self.inner.read()).records)
    }

    /// Records, statistics and ordering of kind `R`, read under one lock.
    pub fn snapshot<R: Stored>(&self) -> Snapshot<R> {
        let tables = self.inner.read();
        let table = R::slot(&tables);
        Snapshot {
            records: Arc::clone(&table.records),
            stats: table.stats.clone(),
            sort: table.sort,
        }
    }

    /// Current ordering of kind `R`.
    pub fn sort_spec<R: Stored>(&self) -> SortSpec<R::Field> {
        R::slot(&self.inner.read()).sort
    }

    /// Swap in freshly fetched records, sorted by the current ordering.
    pub fn replace<R: Stored>(&self, records: Vec<R>) {
        let count = records.len();
        let mut tables = self.inner.write();
        let table = R::slot_mut(&mut tables);
        let mut records = records;
        sort_records(&mut records, &table.sort, table.stats.source());
        table.records = Arc::new(records);
        tables.states.insert(
            R::KIND,
            LoadState::Loaded {
                count,
                fetched_at: Utc::now(),
            },
        );
        debug!(kind = R::KIND.label(), count, "records replaced");
    }

    /// Swap in freshly fetched statistics for kind `R`.
    ///
    /// The records are re-sorted since the active ordering may read them.
    pub fn replace_stats<R: Stored>(&self, records: Vec<StatsRecord>) {
        let count = records.len();
        let mut tables = self.inner.write();
        let table = R::slot_mut(&mut tables);
        table.stats = StatsTables::from_records(records);
        table.resort();
        if let Some(kind) = R::STATS {
            tables.states.insert(
                kind,
                LoadState::Loaded {
                    count,
                    fetched_at: Utc::now(),
                },
            );
        }
        debug!(kind = R::KIND.label(), count, "statistics replaced");
    }

    /// Re-sort kind `R` by `spec`.
    pub fn sort<R: Stored>(&self, spec: SortSpec<R::Field>) {
        let mut tables = self.inner.write();
        let table = R::slot_mut(&mut tables);
        table.sort = spec;
        table.resort();
    }

    /// Record a load outcome that carries no records.
    pub fn set_state(&self, kind: DataKind, state: LoadState) {
        self.inner.write().states.insert(kind, state);
    }

    /// Load progress of `kind`.
    pub fn state(&self, kind: DataKind) -> LoadState {
        self.inner
            .read()
            .states
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Kinds whose load failed, in [`DataKind::ALL`] order.
    pub fn failed_kinds(&self) -> Vec<DataKind> {
        let tables = self.inner.read();
        DataKind::ALL
            .into_iter()
            .filter(|kind| matches!(tables.states.get(kind), Some(LoadState::Failed(_))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatisticBlock;
    use crate::table::fields::{DenominationField, IssueYearField};
    use crate::table::stats::StatsScope;

    fn years(values: &[i32]) -> Vec<IssueYear> {
        values
            .iter()
            .enumerate()
            .map(|(idx, year)| IssueYear {
                id: idx as u32 + 1,
                year: *year,
            })
            .collect()
    }

    #[test]
    fn replace_sorts_with_current_spec() {
        let store = CatalogStore::new();
        store.replace(years(&[1990, 1850, 1920]));
        let sorted: Vec<i32> = store.records::<IssueYear>().iter().map(|y| y.year).collect();
        assert_eq!(sorted, vec![1850, 1920, 1990]);
        assert!(matches!(
            store.state(DataKind::IssueYears),
            LoadState::Loaded { count: 3, .. }
        ));
    }

    #[test]
    fn snapshots_survive_replacement() {
        let store = CatalogStore::new();
        store.replace(years(&[1990, 1850]));
        let before = store.records::<IssueYear>();
        store.sort::<IssueYear>(SortSpec::desc(IssueYearField::Year));
        store.replace(years(&[2001]));

        assert_eq!(before.len(), 2);
        assert_eq!(before[0].year, 1850);
        assert_eq!(store.records::<IssueYear>().len(), 1);
    }

    #[test]
    fn stats_arrival_resorts_stats_ordering() {
        let store = CatalogStore::new();
        store.replace(vec![
            Denomination { id: 1, value: 5.0 },
            Denomination { id: 2, value: 10.0 },
        ]);
        store.sort::<Denomination>(
            SortSpec::desc(DenominationField::Notes).with_scope(StatsScope::Catalog),
        );
        store.replace_stats::<Denomination>(vec![StatsRecord {
            id: 2,
            catalog: StatisticBlock {
                notes: 4,
                ..Default::default()
            },
            collection: None,
        }]);

        let snapshot = store.snapshot::<Denomination>();
        let ids: Vec<u32> = snapshot.records.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(snapshot.stats.source().block(StatsScope::Catalog, 2).map(|b| b.notes), Some(4));
        assert!(matches!(
            store.state(DataKind::DenominationStats),
            LoadState::Loaded { count: 1, .. }
        ));
    }

    #[test]
    fn failed_kinds_are_listed() {
        let store = CatalogStore::new();
        store.set_state(DataKind::CurrencyStats, LoadState::Failed("offline".to_string()));
        store.set_state(DataKind::Collection, LoadState::Skipped);
        assert_eq!(store.failed_kinds(), vec![DataKind::CurrencyStats]);
        assert_eq!(store.state(DataKind::Territories), LoadState::Pending);
    }
}

//! Cross-tab summaries for the statistics overlays.

use std::ops::{Add, AddAssign};

use crate::models::{Currency, Territory, TerritoryType};

use super::stats::{StatsScope, StatsSource};

/// Counters of one summary cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Data {
    /// Records in the category.
    pub total: u32,
    /// Records with at least one collected variant.
    pub collection: u32,
    /// Records issuing at least one currency; territories only.
    pub issuer: u32,
}

impl Add for Data {
    type Output = Data;

    fn add(self, other: Data) -> Data {
        Data {
            total: self.total + other.total,
            collection: self.collection + other.collection,
            issuer: self.issuer + other.issuer,
        }
    }
}

impl AddAssign for Data {
    fn add_assign(&mut self, other: Data) {
        *self = *self + other;
    }
}

/// Current and extinct counters of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pair {
    /// Records without an end year.
    pub current: Data,
    /// Records with an end year.
    pub extinct: Data,
}

impl Pair {
    fn record(&mut self, current: bool, data: Data) {
        if current {
            self.current += data;
        } else {
            self.extinct += data;
        }
    }

    /// Current plus extinct.
    pub fn combined(&self) -> Data {
        self.current + self.extinct
    }
}

impl Add for Pair {
    type Output = Pair;

    fn add(self, other: Pair) -> Pair {
        Pair {
            current: self.current + other.current,
            extinct: self.extinct + other.extinct,
        }
    }
}

impl AddAssign for Pair {
    fn add_assign(&mut self, other: Pair) {
        *self = *self + other;
    }
}

/// Label of the grand total row.
pub const TOTAL: &str = "Total";
/// Label of the shared-currency row.
pub const SHARED: &str = "Shared";

/// Category rows in display order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    /// `(label, counters)` pairs.
    pub rows: Vec<(String, Pair)>,
}

impl Summary {
    /// Counters of the row labelled `label`.
    pub fn get(&self, label: &str) -> Option<Pair> {
        self.rows
            .iter()
            .find(|(row, _)| row == label)
            .map(|(_, pair)| *pair)
    }
}

fn collected(stats: StatsSource<'_>, id: u32) -> bool {
    stats
        .block(StatsScope::Collection, id)
        .is_some_and(|block| block.variants > 0)
}

/// Territories by type, followed by a total of every category.
pub fn territory_summary<'a, I>(territories: I, stats: StatsSource<'_>) -> Summary
where
    I: IntoIterator<Item = &'a Territory>,
{
    let mut by_type = [Pair::default(); TerritoryType::ALL.len()];
    for territory in territories {
        let slot = TerritoryType::ALL
            .iter()
            .position(|kind| *kind == territory.territory_type)
            .unwrap_or_default();
        let issuer = stats
            .block(StatsScope::Catalog, territory.id)
            .is_some_and(|block| block.currencies > 0);
        by_type[slot].record(
            territory.is_current(),
            Data {
                total: 1,
                collection: u32::from(collected(stats, territory.id)),
                issuer: u32::from(issuer),
            },
        );
    }

    let total = by_type.iter().fold(Pair::default(), |acc, pair| acc + *pair);
    let mut rows: Vec<(String, Pair)> = TerritoryType::ALL
        .iter()
        .zip(by_type)
        .map(|(kind, pair)| (kind.label().to_string(), pair))
        .collect();
    rows.push((TOTAL.to_string(), total));
    Summary { rows }
}

/// All currencies, and the subset shared between territories.
pub fn currency_summary<'a, I>(currencies: I, stats: StatsSource<'_>) -> Summary
where
    I: IntoIterator<Item = &'a Currency>,
{
    let mut total = Pair::default();
    let mut shared = Pair::default();
    for currency in currencies {
        let data = Data {
            total: 1,
            collection: u32::from(collected(stats, currency.id)),
            issuer: 0,
        };
        total.record(currency.is_current(), data);
        if currency.is_shared() {
            shared.record(currency.is_current(), data);
        }
    }
    Summary {
        rows: vec![(TOTAL.to_string(), total), (SHARED.to_string(), shared)],
    }
}

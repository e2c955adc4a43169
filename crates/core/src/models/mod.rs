//! Shared domain models.

use serde::{Deserialize, Serialize};

/// Reference to another catalog entity by id and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Identifier of the referenced entity.
    pub id: u32,
    /// Display name of the referenced entity.
    pub name: String,
}

impl Link {
    /// Convenience constructor.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Political status of a territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryType {
    /// Sovereign state.
    Independent,
    /// Dependent territory, colony or overseas region.
    Territory,
    /// State recognised by part of the international community.
    PartiallyRecognized,
    /// State without international recognition.
    NotRecognized,
}

impl TerritoryType {
    /// Every territory type, in display order.
    pub const ALL: [TerritoryType; 4] = [
        TerritoryType::Independent,
        TerritoryType::Territory,
        TerritoryType::PartiallyRecognized,
        TerritoryType::NotRecognized,
    ];

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            TerritoryType::Independent => "Independent",
            TerritoryType::Territory => "Territory",
            TerritoryType::PartiallyRecognized => "Partially recognized",
            TerritoryType::NotRecognized => "Not recognized",
        }
    }
}

/// A country or territory that has issued (or used) banknotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Territory {
    /// Stable identifier.
    pub id: u32,
    /// Common name.
    pub name: String,
    /// ISO 3166 alpha-3 code, when one exists.
    #[serde(default)]
    pub iso3: Option<String>,
    /// Continent the territory belongs to.
    pub continent: Link,
    /// Political status.
    #[serde(rename = "type")]
    pub territory_type: TerritoryType,
    /// Year the territory came into existence.
    pub start: i32,
    /// Year the territory ceased to exist; `None` while it still exists.
    #[serde(default)]
    pub end: Option<i32>,
    /// Territory this one depends on.
    #[serde(default)]
    pub parent: Option<Link>,
    /// Bundled flag image reference.
    #[serde(default)]
    pub flag: Option<String>,
}

impl Territory {
    /// Whether the territory still exists.
    pub fn is_current(&self) -> bool {
        self.end.is_none()
    }
}

/// Whether a currency belongs to a single territory or is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyType {
    /// Issued for a single territory.
    National,
    /// Used jointly by more than one territory.
    Shared,
}

impl CurrencyType {
    /// Every currency type, in display order.
    pub const ALL: [CurrencyType; 2] = [CurrencyType::National, CurrencyType::Shared];

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            CurrencyType::National => "National",
            CurrencyType::Shared => "Shared",
        }
    }
}

/// One period during which a territory owned a currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ownership {
    /// Owning territory.
    pub territory: Link,
    /// First year of ownership.
    pub start: i32,
    /// Last year of ownership.
    #[serde(default)]
    pub end: Option<i32>,
}

/// A currency in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    /// Stable identifier.
    pub id: u32,
    /// Currency name.
    pub name: String,
    /// ISO 4217 code, when one exists.
    #[serde(default)]
    pub iso3: Option<String>,
    /// Continent of the (main) owning territory.
    pub continent_id: u32,
    /// National or shared.
    #[serde(rename = "type")]
    pub currency_type: CurrencyType,
    /// Year of introduction.
    pub start: i32,
    /// Year of withdrawal; `None` while in circulation.
    #[serde(default)]
    pub end: Option<i32>,
    /// Ownership periods, in no particular order.
    #[serde(default)]
    pub owned_by: Vec<Ownership>,
}

impl Currency {
    /// Whether the currency is still in circulation.
    pub fn is_current(&self) -> bool {
        self.end.is_none()
    }

    /// Whether the currency is used jointly by more than one territory.
    pub fn is_shared(&self) -> bool {
        self.currency_type == CurrencyType::Shared
    }

    /// The ownership record with the latest start year.
    ///
    /// Owners sharing the latest start year resolve to the lowest territory id.
    pub fn latest_owner(&self) -> Option<&Ownership> {
        self.owned_by.iter().reduce(|best, candidate| {
            let newer = candidate.start > best.start;
            let tie_lower_id =
                candidate.start == best.start && candidate.territory.id < best.territory.id;
            if newer || tie_lower_id {
                candidate
            } else {
                best
            }
        })
    }
}

/// A face value appearing in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Denomination {
    /// Stable identifier.
    pub id: u32,
    /// Face value.
    pub value: f64,
}

/// A year in which notes were issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueYear {
    /// Stable identifier.
    pub id: u32,
    /// Calendar year.
    pub year: i32,
}

/// A note variant owned by the user.
///
/// Territory, currency, denomination and issue date are required to render
/// the item; they are optional here so incomplete payloads can be reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionItem {
    /// Stable identifier.
    pub id: u32,
    /// Continent of the issuing territory.
    pub continent_id: u32,
    /// Issuing territory.
    #[serde(default)]
    pub territory: Option<Link>,
    /// Currency of the note.
    #[serde(default)]
    pub currency: Option<Link>,
    /// Issue series the note belongs to.
    #[serde(default)]
    pub series: Option<Link>,
    /// Face value.
    #[serde(default)]
    pub denomination: Option<f64>,
    /// Issue date as printed in the catalog (`1995`, `1990-1992`).
    #[serde(default)]
    pub issue_date: Option<String>,
    /// Catalog reference such as `P-12a`.
    #[serde(default)]
    pub catalog_id: Option<String>,
    /// Condition grade.
    #[serde(default)]
    pub grade: Option<String>,
    /// Number of copies owned.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Price paid for the item.
    #[serde(default)]
    pub price: f64,
}

fn default_quantity() -> u32 {
    1
}

/// Counters describing a record within one statistics scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticBlock {
    /// Number of currencies.
    pub currencies: u32,
    /// Number of issue series.
    pub issues: u32,
    /// Number of distinct denominations.
    pub denominations: u32,
    /// Number of note types.
    pub notes: u32,
    /// Number of note variants.
    pub variants: u32,
    /// Summed price, unknown when the source does not report one.
    pub price: Option<f64>,
}

/// Wire shape of a statistics payload: one record id with both scopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsRecord {
    /// Identifier of the record the statistics describe.
    pub id: u32,
    /// Catalog-wide counters.
    #[serde(default)]
    pub catalog: StatisticBlock,
    /// Counters for the user's collection, absent when nothing is owned.
    #[serde(default)]
    pub collection: Option<StatisticBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(id: u32, name: &str, start: i32) -> Ownership {
        Ownership {
            territory: Link::new(id, name),
            start,
            end: None,
        }
    }

    #[test]
    fn latest_owner_prefers_newest_start() {
        let currency = Currency {
            id: 1,
            name: "Franc".to_string(),
            iso3: None,
            continent_id: 1,
            currency_type: CurrencyType::Shared,
            start: 1900,
            end: None,
            owned_by: vec![owner(7, "Alpha", 1900), owner(3, "Beta", 1960), owner(9, "Gamma", 1930)],
        };
        assert_eq!(currency.latest_owner().map(|o| o.territory.id), Some(3));
    }

    #[test]
    fn latest_owner_tie_resolves_to_lowest_territory_id() {
        let currency = Currency {
            id: 1,
            name: "Franc".to_string(),
            iso3: None,
            continent_id: 1,
            currency_type: CurrencyType::Shared,
            start: 1900,
            end: None,
            owned_by: vec![owner(9, "Zeta", 1960), owner(4, "Eta", 1960), owner(6, "Theta", 1960)],
        };
        assert_eq!(currency.latest_owner().map(|o| o.territory.name.as_str()), Some("Eta"));
    }

    #[test]
    fn collection_item_decodes_with_missing_fields() {
        let item: CollectionItem =
            serde_json::from_str(r#"{"id": 4, "continent_id": 2, "price": 3.5}"#).unwrap();
        assert_eq!(item.quantity, 1);
        assert!(item.territory.is_none());
        assert!(item.denomination.is_none());
    }

    #[test]
    fn stats_record_defaults_missing_counters() {
        let record: StatsRecord =
            serde_json::from_str(r#"{"id": 2, "catalog": {"notes": 12}}"#).unwrap();
        assert_eq!(record.catalog.notes, 12);
        assert_eq!(record.catalog.currencies, 0);
        assert!(record.catalog.price.is_none());
        assert!(record.collection.is_none());
    }
}

//! Field tables for every record kind.
//!
//! Each kind declares its closed field enum and maps every field to an
//! ordering accessor and a cell projection.

use crate::{
    error::TableError,
    models::{CollectionItem, Currency, Denomination, IssueYear, Territory},
};

use super::{
    format::format_number,
    projection::{Aggregation, Cell, Project},
    sort::{Accessor, SortValue, Sortable},
    stats::Metric,
};

/// Fields of the territory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerritoryField {
    /// Flag image; orders by name.
    Flag,
    /// Territory name.
    Name,
    /// ISO 3166 alpha-3 code.
    Iso3,
    /// Continent name.
    Continent,
    /// Political status.
    Type,
    /// Name of the territory this one depends on.
    Parent,
    /// Founding year.
    Start,
    /// End year; open-ended territories order last.
    End,
    /// Currency count.
    Currencies,
    /// Issue series count.
    Issues,
    /// Distinct denomination count.
    Denominations,
    /// Note type count.
    Notes,
    /// Note variant count.
    Variants,
    /// Summed price.
    Price,
}

/// Fields of the currency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurrencyField {
    /// Currency name.
    Name,
    /// ISO 4217 code.
    Iso3,
    /// Name of the owner with the latest start year.
    OwnedBy,
    /// National or shared.
    Type,
    /// Introduction year.
    Start,
    /// Withdrawal year; currencies in circulation order last.
    End,
    /// Issue series count.
    Issues,
    /// Distinct denomination count.
    Denominations,
    /// Note type count.
    Notes,
    /// Note variant count.
    Variants,
    /// Summed price.
    Price,
}

/// Fields of the denomination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenominationField {
    /// Face value.
    Value,
    /// Currency count.
    Currencies,
    /// Note type count.
    Notes,
    /// Note variant count.
    Variants,
    /// Summed price.
    Price,
}

/// Fields of the issue-year table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueYearField {
    /// Calendar year.
    Year,
    /// Currency count.
    Currencies,
    /// Issue series count.
    Issues,
    /// Distinct denomination count.
    Denominations,
    /// Note type count.
    Notes,
    /// Note variant count.
    Variants,
    /// Summed price.
    Price,
}

/// Fields of the collection table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionField {
    /// Issuing territory.
    Territory,
    /// Currency of the note.
    Currency,
    /// Issue series.
    Series,
    /// Face value.
    Denomination,
    /// Issue date as printed.
    IssueDate,
    /// Catalog reference.
    CatalogId,
    /// Condition grade.
    Grade,
    /// Copies owned.
    Quantity,
    /// Price paid.
    Price,
}

impl CollectionField {
    /// Price subtotals on group breaks of the sorted field.
    pub fn aggregation() -> Aggregation<CollectionItem> {
        Aggregation {
            price_field: CollectionField::Price,
            price: |item: &CollectionItem| item.price,
        }
    }
}

fn year(value: i32) -> Cell {
    Cell::Text(value.to_string())
}

fn opt_year(value: Option<i32>) -> Cell {
    value.map_or(Cell::Placeholder, year)
}

fn required<T>(value: Option<T>, id: u32, field: &'static str) -> Result<T, TableError> {
    value.ok_or(TableError::MissingField { id, field })
}

impl Sortable for Territory {
    type Field = TerritoryField;

    fn id(&self) -> u32 {
        self.id
    }

    fn accessor(field: TerritoryField) -> Accessor<Self> {
        match field {
            TerritoryField::Flag | TerritoryField::Name => Accessor::Key(|t| SortValue::Text(&t.name)),
            TerritoryField::Iso3 => Accessor::Key(|t| SortValue::OptText(t.iso3.as_deref())),
            TerritoryField::Continent => Accessor::Key(|t| SortValue::Text(&t.continent.name)),
            TerritoryField::Type => Accessor::Key(|t| SortValue::Text(t.territory_type.label())),
            TerritoryField::Parent => {
                Accessor::Key(|t| SortValue::OptText(t.parent.as_ref().map(|p| p.name.as_str())))
            }
            TerritoryField::Start => Accessor::Key(|t| SortValue::Int(i64::from(t.start))),
            TerritoryField::End => Accessor::Key(|t| SortValue::OptInt(t.end.map(i64::from))),
            TerritoryField::Currencies => Accessor::Stat(Metric::Currencies),
            TerritoryField::Issues => Accessor::Stat(Metric::Issues),
            TerritoryField::Denominations => Accessor::Stat(Metric::Denominations),
            TerritoryField::Notes => Accessor::Stat(Metric::Notes),
            TerritoryField::Variants => Accessor::Stat(Metric::Variants),
            TerritoryField::Price => Accessor::Stat(Metric::Price),
        }
    }
}

impl Project for Territory {
    fn cell(&self, field: TerritoryField) -> Result<Cell, TableError> {
        Ok(match field {
            TerritoryField::Flag => Cell::Image(self.flag.clone()),
            TerritoryField::Name => Cell::Link {
                id: self.id,
                label: self.name.clone(),
            },
            TerritoryField::Iso3 => Cell::opt_text(self.iso3.as_deref()),
            TerritoryField::Continent => Cell::Text(self.continent.name.clone()),
            TerritoryField::Type => Cell::Text(self.territory_type.label().to_string()),
            TerritoryField::Parent => Cell::opt_link(self.parent.as_ref()),
            TerritoryField::Start => year(self.start),
            TerritoryField::End => opt_year(self.end),
            _ => Cell::Placeholder,
        })
    }
}

impl Sortable for Currency {
    type Field = CurrencyField;

    fn id(&self) -> u32 {
        self.id
    }

    fn accessor(field: CurrencyField) -> Accessor<Self> {
        match field {
            CurrencyField::Name => Accessor::Key(|c| SortValue::Text(&c.name)),
            CurrencyField::Iso3 => Accessor::Key(|c| SortValue::OptText(c.iso3.as_deref())),
            CurrencyField::OwnedBy => Accessor::Key(|c| {
                SortValue::OptText(c.latest_owner().map(|owner| owner.territory.name.as_str()))
            }),
            CurrencyField::Type => Accessor::Key(|c| SortValue::Text(c.currency_type.label())),
            CurrencyField::Start => Accessor::Key(|c| SortValue::Int(i64::from(c.start))),
            CurrencyField::End => Accessor::Key(|c| SortValue::OptInt(c.end.map(i64::from))),
            CurrencyField::Issues => Accessor::Stat(Metric::Issues),
            CurrencyField::Denominations => Accessor::Stat(Metric::Denominations),
            CurrencyField::Notes => Accessor::Stat(Metric::Notes),
            CurrencyField::Variants => Accessor::Stat(Metric::Variants),
            CurrencyField::Price => Accessor::Stat(Metric::Price),
        }
    }
}

impl Project for Currency {
    fn cell(&self, field: CurrencyField) -> Result<Cell, TableError> {
        Ok(match field {
            CurrencyField::Name => Cell::Link {
                id: self.id,
                label: self.name.clone(),
            },
            CurrencyField::Iso3 => Cell::opt_text(self.iso3.as_deref()),
            CurrencyField::OwnedBy => Cell::opt_link(self.latest_owner().map(|owner| &owner.territory)),
            CurrencyField::Type => Cell::Text(self.currency_type.label().to_string()),
            CurrencyField::Start => year(self.start),
            CurrencyField::End => opt_year(self.end),
            _ => Cell::Placeholder,
        })
    }
}

impl Sortable for Denomination {
    type Field = DenominationField;

    fn id(&self) -> u32 {
        self.id
    }

    fn accessor(field: DenominationField) -> Accessor<Self> {
        match field {
            DenominationField::Value => Accessor::Key(|d| SortValue::Float(d.value)),
            DenominationField::Currencies => Accessor::Stat(Metric::Currencies),
            DenominationField::Notes => Accessor::Stat(Metric::Notes),
            DenominationField::Variants => Accessor::Stat(Metric::Variants),
            DenominationField::Price => Accessor::Stat(Metric::Price),
        }
    }
}

impl Project for Denomination {
    fn cell(&self, field: DenominationField) -> Result<Cell, TableError> {
        Ok(match field {
            DenominationField::Value => Cell::Link {
                id: self.id,
                label: format_number(self.value),
            },
            _ => Cell::Placeholder,
        })
    }
}

impl Sortable for IssueYear {
    type Field = IssueYearField;

    fn id(&self) -> u32 {
        self.id
    }

    fn accessor(field: IssueYearField) -> Accessor<Self> {
        match field {
            IssueYearField::Year => Accessor::Key(|y| SortValue::Int(i64::from(y.year))),
            IssueYearField::Currencies => Accessor::Stat(Metric::Currencies),
            IssueYearField::Issues => Accessor::Stat(Metric::Issues),
            IssueYearField::Denominations => Accessor::Stat(Metric::Denominations),
            IssueYearField::Notes => Accessor::Stat(Metric::Notes),
            IssueYearField::Variants => Accessor::Stat(Metric::Variants),
            IssueYearField::Price => Accessor::Stat(Metric::Price),
        }
    }
}

impl Project for IssueYear {
    fn cell(&self, field: IssueYearField) -> Result<Cell, TableError> {
        Ok(match field {
            IssueYearField::Year => Cell::Link {
                id: self.id,
                label: self.year.to_string(),
            },
            _ => Cell::Placeholder,
        })
    }
}

impl Sortable for CollectionItem {
    type Field = CollectionField;

    fn id(&self) -> u32 {
        self.id
    }

    fn accessor(field: CollectionField) -> Accessor<Self> {
        match field {
            CollectionField::Territory => {
                Accessor::Key(|i| SortValue::OptText(i.territory.as_ref().map(|l| l.name.as_str())))
            }
            CollectionField::Currency => {
                Accessor::Key(|i| SortValue::OptText(i.currency.as_ref().map(|l| l.name.as_str())))
            }
            CollectionField::Series => {
                Accessor::Key(|i| SortValue::OptText(i.series.as_ref().map(|l| l.name.as_str())))
            }
            CollectionField::Denomination => Accessor::Key(|i| SortValue::OptFloat(i.denomination)),
            CollectionField::IssueDate => Accessor::Key(|i| SortValue::OptText(i.issue_date.as_deref())),
            CollectionField::CatalogId => Accessor::Key(|i| SortValue::OptText(i.catalog_id.as_deref())),
            CollectionField::Grade => Accessor::Key(|i| SortValue::OptText(i.grade.as_deref())),
            CollectionField::Quantity => Accessor::Key(|i| SortValue::Int(i64::from(i.quantity))),
            CollectionField::Price => Accessor::Key(|i| SortValue::Float(i.price)),
        }
    }
}

impl Project for CollectionItem {
    fn cell(&self, field: CollectionField) -> Result<Cell, TableError> {
        let id = self.id;
        Ok(match field {
            CollectionField::Territory => {
                Cell::opt_link(Some(required(self.territory.as_ref(), id, "territory")?))
            }
            CollectionField::Currency => {
                Cell::opt_link(Some(required(self.currency.as_ref(), id, "currency")?))
            }
            CollectionField::Series => Cell::opt_link(self.series.as_ref()),
            CollectionField::Denomination => {
                Cell::Text(format_number(required(self.denomination, id, "denomination")?))
            }
            CollectionField::IssueDate => {
                Cell::Text(required(self.issue_date.clone(), id, "issue date")?)
            }
            CollectionField::CatalogId => Cell::opt_text(self.catalog_id.as_deref()),
            CollectionField::Grade => Cell::opt_text(self.grade.as_deref()),
            CollectionField::Quantity => Cell::Text(self.quantity.to_string()),
            CollectionField::Price => Cell::Text(format_number(self.price)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrencyType, Link, Ownership, TerritoryType};
    use crate::table::sort::{sort_records, SortSpec};
    use crate::table::stats::StatsSource;

    fn currency(id: u32, owners: &[(u32, &str, i32)]) -> Currency {
        Currency {
            id,
            name: format!("Currency {id}"),
            iso3: None,
            continent_id: 1,
            currency_type: CurrencyType::National,
            start: 1900,
            end: None,
            owned_by: owners
                .iter()
                .map(|(tid, name, start)| Ownership {
                    territory: Link::new(*tid, *name),
                    start: *start,
                    end: None,
                })
                .collect(),
        }
    }

    #[test]
    fn owned_by_sorts_on_most_recent_owner() {
        let mut currencies = vec![
            currency(1, &[(1, "Austria", 1900), (2, "Zambia", 1990)]),
            currency(2, &[(3, "Belgium", 1950)]),
            currency(3, &[(4, "Angola", 1975), (5, "Chad", 1920)]),
            currency(4, &[]),
        ];
        sort_records(&mut currencies, &SortSpec::asc(CurrencyField::OwnedBy), StatsSource::empty());
        let ids: Vec<u32> = currencies.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn territory_cells_follow_field_table() -> Result<(), TableError> {
        let territory = Territory {
            id: 8,
            name: "Rhodesia".to_string(),
            iso3: None,
            continent: Link::new(2, "Africa"),
            territory_type: TerritoryType::NotRecognized,
            start: 1965,
            end: Some(1979),
            parent: Some(Link::new(3, "United Kingdom")),
            flag: Some("rhodesia.png".to_string()),
        };
        assert_eq!(territory.cell(TerritoryField::Flag)?, Cell::Image(Some("rhodesia.png".to_string())));
        assert_eq!(
            territory.cell(TerritoryField::Name)?,
            Cell::Link {
                id: 8,
                label: "Rhodesia".to_string()
            }
        );
        assert_eq!(territory.cell(TerritoryField::Iso3)?, Cell::Placeholder);
        assert_eq!(territory.cell(TerritoryField::End)?, Cell::Text("1979".to_string()));
        assert_eq!(territory.cell(TerritoryField::Parent)?.label(), "United Kingdom");
        Ok(())
    }

    #[test]
    fn denomination_value_is_formatted() -> Result<(), TableError> {
        let denomination = Denomination {
            id: 3,
            value: 10000.0,
        };
        assert_eq!(denomination.cell(DenominationField::Value)?.label(), "10,000");
        Ok(())
    }
}

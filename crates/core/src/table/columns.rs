//! Default column layouts and orderings for each table.

use super::{
    fields::{CollectionField, CurrencyField, DenominationField, IssueYearField, TerritoryField},
    model::{Align, ColumnSpec, TableModel},
    sort::SortSpec,
};

/// Columns of the territory table.
pub fn territory_columns() -> Vec<ColumnSpec<TerritoryField>> {
    vec![
        ColumnSpec::new("Flag", 4, TerritoryField::Flag)
            .align(Align::Center)
            .unsortable(),
        ColumnSpec::new("Name", 24, TerritoryField::Name),
        ColumnSpec::new("ISO3", 5, TerritoryField::Iso3),
        ColumnSpec::new("Continent", 14, TerritoryField::Continent).hidden(),
        ColumnSpec::new("Type", 20, TerritoryField::Type),
        ColumnSpec::new("Part of", 18, TerritoryField::Parent).hidden(),
        ColumnSpec::new("Start", 6, TerritoryField::Start).align(Align::End),
        ColumnSpec::new("End", 6, TerritoryField::End).align(Align::End),
        ColumnSpec::stats("Currencies", 5, TerritoryField::Currencies),
        ColumnSpec::stats("Issues", 5, TerritoryField::Issues),
        ColumnSpec::stats("Denominations", 5, TerritoryField::Denominations).hidden(),
        ColumnSpec::stats("Notes", 6, TerritoryField::Notes),
        ColumnSpec::stats("Variants", 6, TerritoryField::Variants),
        ColumnSpec::stats("Price", 10, TerritoryField::Price).hidden(),
    ]
}

/// Columns of the currency table.
pub fn currency_columns() -> Vec<ColumnSpec<CurrencyField>> {
    vec![
        ColumnSpec::new("Name", 24, CurrencyField::Name),
        ColumnSpec::new("ISO3", 5, CurrencyField::Iso3),
        ColumnSpec::new("Owned by", 20, CurrencyField::OwnedBy),
        ColumnSpec::new("Type", 9, CurrencyField::Type).hidden(),
        ColumnSpec::new("Start", 6, CurrencyField::Start).align(Align::End),
        ColumnSpec::new("End", 6, CurrencyField::End).align(Align::End),
        ColumnSpec::stats("Issues", 5, CurrencyField::Issues),
        ColumnSpec::stats("Denominations", 5, CurrencyField::Denominations),
        ColumnSpec::stats("Notes", 6, CurrencyField::Notes),
        ColumnSpec::stats("Variants", 6, CurrencyField::Variants),
        ColumnSpec::stats("Price", 10, CurrencyField::Price).hidden(),
    ]
}

/// Columns of the denomination table.
pub fn denomination_columns() -> Vec<ColumnSpec<DenominationField>> {
    vec![
        ColumnSpec::new("Denomination", 14, DenominationField::Value).align(Align::End),
        ColumnSpec::stats("Currencies", 5, DenominationField::Currencies),
        ColumnSpec::stats("Notes", 6, DenominationField::Notes),
        ColumnSpec::stats("Variants", 6, DenominationField::Variants),
        ColumnSpec::stats("Price", 10, DenominationField::Price),
    ]
}

/// Columns of the issue-year table.
pub fn issue_year_columns() -> Vec<ColumnSpec<IssueYearField>> {
    vec![
        ColumnSpec::new("Year", 6, IssueYearField::Year).align(Align::End),
        ColumnSpec::stats("Currencies", 5, IssueYearField::Currencies),
        ColumnSpec::stats("Issues", 5, IssueYearField::Issues),
        ColumnSpec::stats("Denominations", 5, IssueYearField::Denominations),
        ColumnSpec::stats("Notes", 6, IssueYearField::Notes),
        ColumnSpec::stats("Variants", 6, IssueYearField::Variants),
        ColumnSpec::stats("Price", 10, IssueYearField::Price).hidden(),
    ]
}

/// Columns of the collection table.
pub fn collection_columns() -> Vec<ColumnSpec<CollectionField>> {
    vec![
        ColumnSpec::new("Territory", 20, CollectionField::Territory),
        ColumnSpec::new("Currency", 16, CollectionField::Currency),
        ColumnSpec::new("Series", 16, CollectionField::Series).hidden(),
        ColumnSpec::new("Denomination", 12, CollectionField::Denomination).align(Align::End),
        ColumnSpec::new("Date", 10, CollectionField::IssueDate),
        ColumnSpec::new("Catalog", 10, CollectionField::CatalogId),
        ColumnSpec::new("Grade", 6, CollectionField::Grade),
        ColumnSpec::new("Qty", 4, CollectionField::Quantity).align(Align::End),
        ColumnSpec::new("Price", 10, CollectionField::Price).align(Align::End),
    ]
}

/// Initial ordering of the territory table.
pub fn territory_sort() -> SortSpec<TerritoryField> {
    SortSpec::asc(TerritoryField::Name)
}

/// Initial ordering of the currency table.
pub fn currency_sort() -> SortSpec<CurrencyField> {
    SortSpec::asc(CurrencyField::Name)
}

/// Initial ordering of the denomination table.
pub fn denomination_sort() -> SortSpec<DenominationField> {
    SortSpec::asc(DenominationField::Value)
}

/// Initial ordering of the issue-year table.
pub fn issue_year_sort() -> SortSpec<IssueYearField> {
    SortSpec::asc(IssueYearField::Year)
}

/// Initial ordering of the collection table.
pub fn collection_sort() -> SortSpec<CollectionField> {
    SortSpec::asc(CollectionField::Territory)
}

/// Territory table with its initial ordering; flag and name stay pinned.
pub fn territory_table() -> TableModel<TerritoryField> {
    TableModel::new(territory_columns(), 2).with_sort(territory_sort())
}

/// Currency table with its initial ordering.
pub fn currency_table() -> TableModel<CurrencyField> {
    TableModel::new(currency_columns(), 1).with_sort(currency_sort())
}

/// Denomination table with its initial ordering.
pub fn denomination_table() -> TableModel<DenominationField> {
    TableModel::new(denomination_columns(), 1).with_sort(denomination_sort())
}

/// Issue-year table with its initial ordering.
pub fn issue_year_table() -> TableModel<IssueYearField> {
    TableModel::new(issue_year_columns(), 1).with_sort(issue_year_sort())
}

/// Collection table with its initial ordering.
pub fn collection_table() -> TableModel<CollectionField> {
    TableModel::new(collection_columns(), 1).with_sort(collection_sort())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::model::ColumnSort;

    #[test]
    fn every_field_has_at_most_one_column() {
        let columns = territory_columns();
        for column in &columns {
            assert_eq!(columns.iter().filter(|c| c.field == column.field).count(), 1);
        }
    }

    #[test]
    fn tables_start_sorted_on_their_first_sortable_column() {
        let table = territory_table();
        assert_eq!(table.column_sort(1), ColumnSort::Asc);
        assert_eq!(table.sort_spec(), Some(territory_sort()));
        assert_eq!(collection_table().sort_spec(), Some(collection_sort()));
        assert_eq!(table.pinned_count(), 2);
    }
}

//! Row projection with optional group-break subtotals.

use crate::error::TableError;

use super::{
    format::format_number,
    model::ColumnSpec,
    sort::{sort_key, Accessor, SortValue, Sortable},
    stats::{StatsScope, StatsSource},
};

/// Placeholder text for unavailable values.
pub const PLACEHOLDER: &str = "-";

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Plain text.
    Text(String),
    /// Clickable reference to another entity.
    Link {
        /// Target entity id.
        id: u32,
        /// Display label.
        label: String,
    },
    /// Image reference, `None` when the record has no image.
    Image(Option<String>),
    /// Value not available.
    Placeholder,
}

impl Cell {
    /// Text shown for the cell.
    pub fn label(&self) -> &str {
        match self {
            Cell::Text(text) => text,
            Cell::Link { label, .. } => label,
            Cell::Image(_) | Cell::Placeholder => PLACEHOLDER,
        }
    }

    /// Cell for an optional string.
    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(Cell::Placeholder, |value| Cell::Text(value.to_string()))
    }

    /// Cell for an optional link.
    pub fn opt_link(value: Option<&crate::models::Link>) -> Self {
        value.map_or(Cell::Placeholder, |link| Cell::Link {
            id: link.id,
            label: link.name.clone(),
        })
    }
}

/// A projected table row.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayRow {
    /// One record.
    Row {
        /// Record id, used for navigation events.
        id: u32,
        /// Cells in visible column order; statistics columns contribute two.
        cells: Vec<Cell>,
    },
    /// Subtotal of a run of records sharing the sorted value.
    Aggregate {
        /// Label of the group (the sorted column's text).
        label: String,
        /// Summed price.
        value: f64,
        /// `value` formatted for display.
        formatted: String,
    },
}

impl DisplayRow {
    fn aggregate(label: String, value: f64) -> Self {
        DisplayRow::Aggregate {
            formatted: format_number(value),
            label,
            value,
        }
    }
}

/// A record kind that can render its fields as cells.
pub trait Project: Sortable {
    /// Cell for a plain (non-statistics) field.
    fn cell(&self, field: Self::Field) -> Result<Cell, TableError>;
}

/// Cells contributed by one column for `record`.
///
/// Statistics columns yield the catalog cell followed by the collection cell.
pub fn column_cells<R: Project>(
    record: &R,
    column: &ColumnSpec<R::Field>,
    stats: StatsSource<'_>,
    out: &mut Vec<Cell>,
) -> Result<(), TableError> {
    match R::accessor(column.field) {
        Accessor::Stat(metric) => {
            for scope in StatsScope::ALL {
                out.push(stats.cell(scope, record.id(), metric));
            }
        }
        Accessor::Key(_) => out.push(record.cell(column.field)?),
    }
    Ok(())
}

/// Group-break subtotal configuration.
pub struct Aggregation<R: Sortable> {
    /// The price field; sorting by it disables subtotals.
    pub price_field: R::Field,
    /// Per-record amount added to the running subtotal.
    pub price: fn(&R) -> f64,
}

struct Group<'a, R: Sortable> {
    field: R::Field,
    price: fn(&R) -> f64,
    current: Option<(SortValue<'a>, String, f64)>,
}

/// Lazy row sequence over a filtered, sorted record list.
pub struct Rows<'a, R: Project, I> {
    records: I,
    columns: &'a [ColumnSpec<R::Field>],
    stats: StatsSource<'a>,
    scope: Option<StatsScope>,
    group: Option<Group<'a, R>>,
    queued: Option<DisplayRow>,
}

/// Project `records` through the visible `columns`.
///
/// `sorted` is the active sort field and scope. With an [`Aggregation`] and a
/// sorted field other than its price field, a subtotal row is emitted after
/// every run of adjacent records with equal sort keys.
pub fn project<'a, R, I>(
    records: I,
    columns: &'a [ColumnSpec<R::Field>],
    stats: StatsSource<'a>,
    sorted: Option<(R::Field, Option<StatsScope>)>,
    aggregation: Option<&Aggregation<R>>,
) -> Rows<'a, R, I::IntoIter>
where
    R: Project + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let group = match (sorted, aggregation) {
        (Some((field, _)), Some(aggregation)) if field != aggregation.price_field => Some(Group {
            field,
            price: aggregation.price,
            current: None,
        }),
        _ => None,
    };
    Rows {
        records: records.into_iter(),
        columns,
        stats,
        scope: sorted.and_then(|(_, scope)| scope),
        group,
        queued: None,
    }
}

impl<'a, R, I> Rows<'a, R, I>
where
    R: Project + 'a,
    I: Iterator<Item = &'a R>,
{
    fn row(&self, record: &R) -> Result<DisplayRow, TableError> {
        let mut cells = Vec::with_capacity(self.columns.len());
        for column in self.columns.iter().filter(|column| column.visible) {
            column_cells(record, column, self.stats, &mut cells)?;
        }
        Ok(DisplayRow::Row {
            id: record.id(),
            cells,
        })
    }

    fn group_label(&self, record: &R, field: R::Field) -> Result<String, TableError> {
        match R::accessor(field) {
            Accessor::Stat(metric) => Ok(self
                .stats
                .cell(self.scope.unwrap_or(StatsScope::Catalog), record.id(), metric)
                .label()
                .to_string()),
            Accessor::Key(_) => Ok(record.cell(field)?.label().to_string()),
        }
    }
}

impl<'a, R, I> Iterator for Rows<'a, R, I>
where
    R: Project + 'a,
    I: Iterator<Item = &'a R>,
{
    type Item = Result<DisplayRow, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(row) = self.queued.take() {
            return Some(Ok(row));
        }

        let Some(record) = self.records.next() else {
            return self
                .group
                .as_mut()
                .and_then(|group| group.current.take())
                .map(|(_, label, total)| Ok(DisplayRow::aggregate(label, total)));
        };

        let row = match self.row(record) {
            Ok(row) => row,
            Err(err) => return Some(Err(err)),
        };

        let Some(field) = self.group.as_ref().map(|group| group.field) else {
            return Some(Ok(row));
        };
        let key = sort_key(record, field, self.scope, self.stats);
        let label = match self.group_label(record, field) {
            Ok(label) => label,
            Err(err) => return Some(Err(err)),
        };
        let Some(group) = self.group.as_mut() else {
            return Some(Ok(row));
        };
        let price = (group.price)(record);

        match group.current.as_mut() {
            Some((current_key, _, total)) if *current_key == key => {
                *total += price;
                Some(Ok(row))
            }
            _ => match group.current.replace((key, label, price)) {
                Some((_, previous_label, previous_total)) => {
                    self.queued = Some(row);
                    Some(Ok(DisplayRow::aggregate(previous_label, previous_total)))
                }
                None => Some(Ok(row)),
            },
        }
    }
}

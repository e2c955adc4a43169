//! In-memory tabular engine shared by every list screen.
//!
//! A screen filters the store's sorted records with a [`filter::FilterSet`],
//! reads sort and visibility state from a [`model::TableModel`], and turns
//! the result into [`projection::DisplayRow`]s. Header clicks yield a new
//! [`sort::SortSpec`] which the store applies to its canonical collection.

pub mod columns;
pub mod fields;
pub mod filter;
pub mod format;
pub mod model;
pub mod projection;
pub mod sort;
pub mod stats;
pub mod summary;

pub use fields::{CollectionField, CurrencyField, DenominationField, IssueYearField, TerritoryField};
pub use filter::{CollectionFilter, CurrencyFilter, FilterDates, FilterSet, RecordFilter, TerritoryFilter};
pub use format::format_number;
pub use model::{ColumnSort, ColumnSpec, TableModel, TableState};
pub use projection::{project, Cell, DisplayRow, Project, PLACEHOLDER};
pub use sort::{sort_records, SortDirection, SortSpec, SortValue, Sortable};
pub use stats::{Metric, StatsScope, StatsSource, StatsTables};
pub use summary::{currency_summary, territory_summary, Data, Pair, Summary};

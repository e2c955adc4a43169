//! Column definitions and the sort/visibility state machine.

use super::{
    sort::{SortDirection, SortSpec},
    stats::StatsScope,
};

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Left aligned.
    #[default]
    Start,
    /// Centered.
    Center,
    /// Right aligned.
    End,
}

/// Declarative description of one table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec<F> {
    /// Header text; also the key under which visibility is persisted.
    pub title: String,
    /// Fixed width in character cells.
    pub width: u16,
    /// Cell alignment.
    pub align: Align,
    /// Whether header clicks change the ordering.
    pub sortable: bool,
    /// Whether the column shows catalog and collection sub-metrics.
    pub stats: bool,
    /// Linked field.
    pub field: F,
    /// Whether the column is shown.
    pub visible: bool,
}

impl<F> ColumnSpec<F> {
    /// A visible, sortable, left-aligned column.
    pub fn new(title: impl Into<String>, width: u16, field: F) -> Self {
        Self {
            title: title.into(),
            width,
            align: Align::Start,
            sortable: true,
            stats: false,
            field,
            visible: true,
        }
    }

    /// A statistics column: right aligned, two sortable sub-metrics.
    pub fn stats(title: impl Into<String>, width: u16, field: F) -> Self {
        Self {
            align: Align::End,
            stats: true,
            ..Self::new(title, width, field)
        }
    }

    /// Set the alignment.
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Disable sorting on this column.
    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Hide the column initially.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Which column (and sub-metric) orders the table.
///
/// `submetric` is set only while a statistics column is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableState {
    /// Index of the sorted column.
    pub column: Option<usize>,
    /// Active direction; meaningless while `column` is `None`.
    pub direction: SortDirection,
    /// Active sub-metric of a statistics column.
    pub submetric: Option<StatsScope>,
}

/// Sort indicator of a single column or sub-metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSort {
    /// Not the active ordering.
    Unsorted,
    /// Active, ascending.
    Asc,
    /// Active, descending.
    Desc,
}

impl From<SortDirection> for ColumnSort {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => ColumnSort::Asc,
            SortDirection::Desc => ColumnSort::Desc,
        }
    }
}

/// Compute the state after a click on column `index`.
///
/// Statistics columns start descending, plain columns ascending. A click on
/// a statistics column without a sub-metric reuses the active one, or the
/// catalog sub-metric when the column is not active.
pub fn transition<F>(
    columns: &[ColumnSpec<F>],
    state: TableState,
    index: usize,
    submetric: Option<StatsScope>,
) -> TableState {
    let Some(column) = columns.get(index) else {
        return state;
    };
    if !column.sortable {
        return state;
    }

    let active = state.column == Some(index);
    if !column.stats {
        return if active {
            TableState {
                direction: state.direction.flip(),
                ..state
            }
        } else {
            TableState {
                column: Some(index),
                direction: SortDirection::Asc,
                submetric: None,
            }
        };
    }

    let requested = submetric
        .or(if active { state.submetric } else { None })
        .unwrap_or(StatsScope::Catalog);
    if active && state.submetric == Some(requested) {
        TableState {
            direction: state.direction.flip(),
            ..state
        }
    } else {
        TableState {
            column: Some(index),
            direction: SortDirection::Desc,
            submetric: Some(requested),
        }
    }
}

/// Columns plus the sort and visibility state of one table.
#[derive(Debug, Clone)]
pub struct TableModel<F> {
    columns: Vec<ColumnSpec<F>>,
    state: TableState,
    pinned: usize,
}

impl<F: Copy + Eq> TableModel<F> {
    /// `pinned` is the minimum number of leading visible columns that do not scroll.
    pub fn new(columns: Vec<ColumnSpec<F>>, pinned: usize) -> Self {
        Self {
            columns,
            state: TableState::default(),
            pinned,
        }
    }

    /// Start with an existing ordering, e.g. the store's current sort.
    pub fn with_sort(mut self, spec: SortSpec<F>) -> Self {
        if let Some(index) = self.find_column_index(spec.field) {
            let stats = self.columns[index].stats;
            self.state = TableState {
                column: Some(index),
                direction: spec.direction,
                submetric: if stats {
                    Some(spec.scope.unwrap_or(StatsScope::Catalog))
                } else {
                    None
                },
            };
        }
        self
    }

    /// All columns, visible or not.
    pub fn columns(&self) -> &[ColumnSpec<F>] {
        &self.columns
    }

    /// Current state.
    pub fn state(&self) -> TableState {
        self.state
    }

    /// Handle a header click. Returns the new ordering when it changed.
    pub fn click(&mut self, index: usize, submetric: Option<StatsScope>) -> Option<SortSpec<F>> {
        let next = transition(&self.columns, self.state, index, submetric);
        if next == self.state {
            return None;
        }
        self.state = next;
        self.sort_spec()
    }

    /// The ordering described by the current state.
    pub fn sort_spec(&self) -> Option<SortSpec<F>> {
        let column = self.columns.get(self.state.column?)?;
        Some(SortSpec {
            field: column.field,
            direction: self.state.direction,
            scope: self.state.submetric,
        })
    }

    /// Indicator for a plain column, or for the column as a whole.
    pub fn column_sort(&self, index: usize) -> ColumnSort {
        if self.state.column == Some(index) {
            self.state.direction.into()
        } else {
            ColumnSort::Unsorted
        }
    }

    /// Indicator for one sub-metric of a statistics column.
    pub fn submetric_sort(&self, index: usize, scope: StatsScope) -> ColumnSort {
        if self.state.column == Some(index) && self.state.submetric == Some(scope) {
            self.state.direction.into()
        } else {
            ColumnSort::Unsorted
        }
    }

    /// Index of the column linked to `field`.
    pub fn find_column_index(&self, field: F) -> Option<usize> {
        self.columns.iter().position(|column| column.field == field)
    }

    /// Show or hide the column linked to `field`. Returns whether a column matched.
    pub fn set_visibility(&mut self, field: F, visible: bool) -> bool {
        match self.columns.iter_mut().find(|column| column.field == field) {
            Some(column) => {
                column.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Visible columns with their indices into [`TableModel::columns`].
    pub fn visible_columns(&self) -> impl Iterator<Item = (usize, &ColumnSpec<F>)> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.visible)
    }

    /// Number of leading visible columns that stay in place while scrolling.
    pub fn pinned_count(&self) -> usize {
        self.pinned.min(self.visible_columns().count())
    }

    /// Titles of hidden columns, for persisting.
    pub fn hidden_titles(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| !column.visible)
            .map(|column| column.title.clone())
            .collect()
    }

    /// Hide exactly the columns whose titles are listed.
    pub fn apply_hidden_titles<S: AsRef<str>>(&mut self, titles: &[S]) {
        for column in &mut self.columns {
            column.visible = !titles.iter().any(|title| title.as_ref() == column.title);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Field {
        Flag,
        Name,
        Start,
        Currencies,
        Notes,
    }

    fn model() -> TableModel<Field> {
        TableModel::new(
            vec![
                ColumnSpec::new("Flag", 4, Field::Flag).unsortable(),
                ColumnSpec::new("Name", 20, Field::Name),
                ColumnSpec::new("Start", 6, Field::Start),
                ColumnSpec::stats("Currencies", 8, Field::Currencies),
                ColumnSpec::stats("Notes", 8, Field::Notes),
            ],
            2,
        )
    }

    fn assert_invariant(model: &TableModel<Field>) {
        let state = model.state();
        let sorted_columns = (0..model.columns().len())
            .filter(|index| model.column_sort(*index) != ColumnSort::Unsorted)
            .count();
        assert!(sorted_columns <= 1);

        match state.column {
            Some(index) => {
                let column = &model.columns()[index];
                assert!(column.sortable);
                assert_eq!(column.stats, state.submetric.is_some());
                let active_submetrics = StatsScope::ALL
                    .iter()
                    .filter(|scope| model.submetric_sort(index, **scope) != ColumnSort::Unsorted)
                    .count();
                assert_eq!(active_submetrics, usize::from(column.stats));
            }
            None => assert!(state.submetric.is_none()),
        }
    }

    #[test]
    fn non_sortable_click_is_noop() {
        let mut model = model();
        assert_eq!(model.click(0, None), None);
        assert_eq!(model.state(), TableState::default());
    }

    #[test]
    fn plain_column_starts_ascending_and_flips() {
        let mut model = model();
        let spec = model.click(1, None).unwrap();
        assert_eq!(spec, SortSpec::asc(Field::Name));
        let spec = model.click(1, None).unwrap();
        assert_eq!(spec, SortSpec::desc(Field::Name));
        let spec = model.click(2, None).unwrap();
        assert_eq!(spec, SortSpec::asc(Field::Start));
        assert_eq!(model.column_sort(1), ColumnSort::Unsorted);
    }

    #[test]
    fn stats_column_click_sequence() {
        let mut model = model();
        model.click(1, None);

        model.click(3, Some(StatsScope::Catalog));
        assert_eq!(
            model.state(),
            TableState {
                column: Some(3),
                direction: SortDirection::Desc,
                submetric: Some(StatsScope::Catalog),
            }
        );

        model.click(3, Some(StatsScope::Catalog));
        assert_eq!(model.state().direction, SortDirection::Asc);
        assert_eq!(model.state().submetric, Some(StatsScope::Catalog));

        model.click(3, Some(StatsScope::Collection));
        assert_eq!(
            model.state(),
            TableState {
                column: Some(3),
                direction: SortDirection::Desc,
                submetric: Some(StatsScope::Collection),
            }
        );
        assert_eq!(
            model.sort_spec(),
            Some(SortSpec::desc(Field::Currencies).with_scope(StatsScope::Collection))
        );
    }

    #[test]
    fn switching_away_from_stats_clears_submetric() {
        let mut model = model();
        model.click(4, Some(StatsScope::Collection));
        model.click(2, None);
        assert_eq!(
            model.state(),
            TableState {
                column: Some(2),
                direction: SortDirection::Asc,
                submetric: None,
            }
        );
    }

    #[test]
    fn stats_click_without_submetric() {
        let mut model = model();
        model.click(3, None);
        assert_eq!(model.state().submetric, Some(StatsScope::Catalog));
        model.click(3, Some(StatsScope::Collection));
        model.click(3, None);
        assert_eq!(model.state().submetric, Some(StatsScope::Collection));
        assert_eq!(model.state().direction, SortDirection::Asc);
    }

    #[test]
    fn out_of_range_click_is_noop() {
        let mut model = model();
        assert_eq!(model.click(42, None), None);
    }

    #[test]
    fn randomized_clicks_keep_single_sorted_column() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut model = model();
        for _ in 0..2_000 {
            let index = rng.gen_range(0..model.columns().len() + 1);
            let submetric = match rng.gen_range(0..3) {
                0 => None,
                1 => Some(StatsScope::Catalog),
                _ => Some(StatsScope::Collection),
            };
            model.click(index, submetric);
            assert_invariant(&model);
        }
    }

    #[test]
    fn visibility_and_pinning() {
        let mut model = model();
        assert_eq!(model.find_column_index(Field::Start), Some(2));
        assert!(model.set_visibility(Field::Start, false));
        assert_eq!(model.visible_columns().count(), 4);
        assert_eq!(model.hidden_titles(), vec!["Start".to_string()]);

        model.apply_hidden_titles(&["Name", "Currencies", "Notes", "Flag"]);
        assert_eq!(model.visible_columns().count(), 1);
        assert_eq!(model.pinned_count(), 1);
    }

    #[test]
    fn set_visibility_ignores_unknown_field() {
        let mut model = TableModel::new(vec![ColumnSpec::new("Name", 20, Field::Name)], 1);
        assert!(!model.set_visibility(Field::Notes, false));
        assert_eq!(model.visible_columns().count(), 1);
    }

    #[test]
    fn with_sort_restores_state() {
        let model = model().with_sort(SortSpec::desc(Field::Notes).with_scope(StatsScope::Collection));
        assert_eq!(model.submetric_sort(4, StatsScope::Collection), ColumnSort::Desc);
        assert_eq!(model.submetric_sort(4, StatsScope::Catalog), ColumnSort::Unsorted);
    }
}

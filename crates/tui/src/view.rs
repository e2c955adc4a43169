use std::collections::BTreeSet;

use anyhow::Result;
use banknotes_core::{
    models::{CollectionItem, Currency, CurrencyType, Territory, TerritoryType},
    preferences::Preferences,
    repository::{CatalogStore, Stored},
    table::{
        filter::NoFilter,
        model::Align,
        projection::{project, Aggregation, Cell, DisplayRow},
        stats::{StatsScope, StatsSource},
        summary::Summary,
        CollectionFilter, ColumnSort, ColumnSpec, CurrencyFilter, FilterDates, RecordFilter,
        TableModel, TerritoryFilter,
    },
    TableError,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState as WidgetState, Wrap},
    Frame,
};
use tracing::{debug, warn};

use crate::app::Theme;

/// Shared state a view may touch while handling a key.
pub struct Context<'a> {
    pub store: &'a CatalogStore,
    pub prefs: &'a mut Preferences,
}

/// A screen of the browser.
pub trait View {
    fn title(&self) -> &'static str;
    fn refresh(&mut self, store: &CatalogStore);
    /// Handle a key; returns a status message when something happened.
    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context<'_>) -> Result<Option<String>>;
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, prefs: &Preferences);
    /// Overlay numbers for the filtered records, if the screen has any.
    fn summary(&self, store: &CatalogStore) -> Option<Summary>;
    /// Whether the view is reading text and wants every key.
    fn capturing_input(&self) -> bool {
        false
    }
}

/// Which year range of a filter a prompt edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearRange {
    /// Founding or introduction year.
    Start,
    /// End or withdrawal year.
    End,
}

/// Filter selection a table screen can change from the keyboard.
///
/// Every hook defaults to "not supported on this screen".
pub trait ViewFilter<R>: RecordFilter<R> + Default {
    /// Continent id of `record`, for building the continent cycle.
    fn continent_of(_record: &R) -> Option<u32> {
        None
    }

    fn continent_mut(&mut self) -> Option<&mut Option<u32>> {
        None
    }

    /// Labels of the type allow-list, in toggle-key order.
    fn type_labels() -> Vec<&'static str> {
        Vec::new()
    }

    /// Flip the `index`-th type in or out of the allow-list.
    fn toggle_type(&mut self, _index: usize) -> bool {
        false
    }

    fn range_mut(&mut self, _range: YearRange) -> Option<&mut FilterDates> {
        None
    }

    fn range_label(_range: YearRange) -> &'static str {
        "years"
    }

    fn toggle_existing(&mut self) -> bool {
        false
    }

    fn toggle_extinct(&mut self) -> bool {
        false
    }

    fn describe(&self) -> String {
        String::new()
    }
}

fn lifecycle(existing: bool, extinct: bool) -> &'static str {
    match (existing, extinct) {
        (true, true) => "all",
        (true, false) => "existing only",
        (false, true) => "extinct only",
        (false, false) => "nothing",
    }
}

fn toggle_member<T: Ord + Copy>(set: &mut BTreeSet<T>, all: &[T], index: usize) -> bool {
    let Some(kind) = all.get(index) else {
        return false;
    };
    if !set.remove(kind) {
        set.insert(*kind);
    }
    true
}

fn describe_range(label: &str, dates: &FilterDates) -> Option<String> {
    if dates.from.is_none() && dates.to.is_none() {
        return None;
    }
    let bound = |value: Option<i32>| value.map_or(String::new(), |year| year.to_string());
    let ignored = if dates.is_valid() { "" } else { " (ignored)" };
    Some(format!("{label} {}-{}{ignored}", bound(dates.from), bound(dates.to)))
}

fn describe_selection<T: Copy>(
    existing: bool,
    extinct: bool,
    types: &BTreeSet<T>,
    all: &[T],
    label: fn(T) -> &'static str,
    ranges: [Option<String>; 2],
) -> String
where
    T: Ord,
{
    let mut parts = vec![format!("showing {}", lifecycle(existing, extinct))];
    if types.len() < all.len() {
        let kept: Vec<&str> = all
            .iter()
            .filter(|kind| types.contains(kind))
            .map(|kind| label(*kind))
            .collect();
        parts.push(if kept.is_empty() {
            "no types".to_string()
        } else {
            kept.join("/")
        });
    }
    parts.extend(ranges.into_iter().flatten());
    parts.join(", ")
}

impl ViewFilter<Territory> for TerritoryFilter {
    fn continent_of(record: &Territory) -> Option<u32> {
        Some(record.continent.id)
    }

    fn continent_mut(&mut self) -> Option<&mut Option<u32>> {
        Some(&mut self.continent)
    }

    fn type_labels() -> Vec<&'static str> {
        TerritoryType::ALL.iter().map(|kind| kind.label()).collect()
    }

    fn toggle_type(&mut self, index: usize) -> bool {
        toggle_member(&mut self.types, &TerritoryType::ALL, index)
    }

    fn range_mut(&mut self, range: YearRange) -> Option<&mut FilterDates> {
        Some(match range {
            YearRange::Start => &mut self.founded,
            YearRange::End => &mut self.ended,
        })
    }

    fn range_label(range: YearRange) -> &'static str {
        match range {
            YearRange::Start => "founded",
            YearRange::End => "ended",
        }
    }

    fn toggle_existing(&mut self) -> bool {
        self.existing = !self.existing;
        true
    }

    fn toggle_extinct(&mut self) -> bool {
        self.extinct = !self.extinct;
        true
    }

    fn describe(&self) -> String {
        describe_selection(
            self.existing,
            self.extinct,
            &self.types,
            &TerritoryType::ALL,
            TerritoryType::label,
            [
                describe_range("founded", &self.founded),
                describe_range("ended", &self.ended),
            ],
        )
    }
}

impl ViewFilter<Currency> for CurrencyFilter {
    fn continent_of(record: &Currency) -> Option<u32> {
        Some(record.continent_id)
    }

    fn continent_mut(&mut self) -> Option<&mut Option<u32>> {
        Some(&mut self.continent)
    }

    fn type_labels() -> Vec<&'static str> {
        CurrencyType::ALL.iter().map(|kind| kind.label()).collect()
    }

    fn toggle_type(&mut self, index: usize) -> bool {
        toggle_member(&mut self.types, &CurrencyType::ALL, index)
    }

    fn range_mut(&mut self, range: YearRange) -> Option<&mut FilterDates> {
        Some(match range {
            YearRange::Start => &mut self.introduced,
            YearRange::End => &mut self.withdrawn,
        })
    }

    fn range_label(range: YearRange) -> &'static str {
        match range {
            YearRange::Start => "introduced",
            YearRange::End => "withdrawn",
        }
    }

    fn toggle_existing(&mut self) -> bool {
        self.existing = !self.existing;
        true
    }

    fn toggle_extinct(&mut self) -> bool {
        self.extinct = !self.extinct;
        true
    }

    fn describe(&self) -> String {
        describe_selection(
            self.existing,
            self.extinct,
            &self.types,
            &CurrencyType::ALL,
            CurrencyType::label,
            [
                describe_range("introduced", &self.introduced),
                describe_range("withdrawn", &self.withdrawn),
            ],
        )
    }
}

impl ViewFilter<CollectionItem> for CollectionFilter {
    fn continent_of(record: &CollectionItem) -> Option<u32> {
        Some(record.continent_id)
    }

    fn continent_mut(&mut self) -> Option<&mut Option<u32>> {
        Some(&mut self.continent)
    }
}

impl<R> ViewFilter<R> for NoFilter {}

/// Next continent in the cycle: all, then each loaded continent, then all again.
fn next_continent(current: Option<u32>, continents: &[u32]) -> Option<u32> {
    match current {
        None => continents.first().copied(),
        Some(id) => continents
            .iter()
            .position(|continent| *continent == id)
            .and_then(|index| continents.get(index + 1))
            .copied(),
    }
}

/// Parse `from-to`, `from-`, `-to` or a single year. Blank input clears the range.
fn parse_year_range(input: &str) -> Option<FilterDates> {
    let input = input.trim();
    if input.is_empty() {
        return Some(FilterDates::default());
    }
    let year = |text: &str| -> Option<Option<i32>> {
        let text = text.trim();
        if text.is_empty() {
            Some(None)
        } else {
            text.parse().ok().map(Some)
        }
    };
    match input.split_once('-') {
        Some((from, to)) => Some(FilterDates::new(year(from)?, year(to)?)),
        None => {
            let single = year(input)?;
            Some(FilterDates::new(single, single))
        }
    }
}

/// Text input for a year range.
#[derive(Debug, Clone)]
struct RangePrompt {
    range: YearRange,
    label: &'static str,
    input: String,
}

impl RangePrompt {
    fn new(range: YearRange, label: &'static str, current: FilterDates) -> Self {
        let input = match (current.from, current.to) {
            (None, None) => String::new(),
            (from, to) => format!(
                "{}-{}",
                from.map_or(String::new(), |year| year.to_string()),
                to.map_or(String::new(), |year| year.to_string())
            ),
        };
        Self {
            range,
            label,
            input,
        }
    }

    fn insert(&mut self, ch: char) {
        if (ch.is_ascii_digit() || ch == '-') && self.input.len() < 16 {
            self.input.push(ch);
        }
    }

    fn backspace(&mut self) {
        self.input.pop();
    }
}

type SummaryFn<R> = fn(&[&R], StatsSource<'_>) -> Summary;

/// Table screen over one record kind.
pub struct TableView<R: Stored, F> {
    title: &'static str,
    scope: &'static str,
    model: TableModel<R::Field>,
    filter: F,
    aggregation: Option<Aggregation<R>>,
    summarize: Option<SummaryFn<R>>,
    rows: Vec<DisplayRow>,
    error: Option<TableError>,
    cursor: usize,
    column: usize,
    scroll: usize,
    prompt: Option<RangePrompt>,
    table_state: WidgetState,
}

impl<R: Stored, F: ViewFilter<R>> TableView<R, F> {
    /// `scope` keys the screen's favorites, history and hidden columns.
    pub fn new(
        title: &'static str,
        scope: &'static str,
        model: TableModel<R::Field>,
        store: &CatalogStore,
        prefs: &Preferences,
    ) -> Self {
        let mut model = model.with_sort(store.sort_spec::<R>());
        if let Some(hidden) = prefs.hidden_columns(scope) {
            model.apply_hidden_titles(&hidden);
        }
        Self {
            title,
            scope,
            model,
            filter: F::default(),
            aggregation: None,
            summarize: None,
            rows: Vec::new(),
            error: None,
            cursor: 0,
            column: 0,
            scroll: 0,
            prompt: None,
            table_state: WidgetState::default(),
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation<R>) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    pub fn with_summary(mut self, summarize: SummaryFn<R>) -> Self {
        self.summarize = Some(summarize);
        self
    }

    fn visible_count(&self) -> usize {
        self.model.visible_columns().count()
    }

    fn current_column(&self) -> Option<(usize, &ColumnSpec<R::Field>)> {
        self.model.visible_columns().nth(self.column)
    }

    fn selected_row(&self) -> Option<(u32, String)> {
        match self.rows.get(self.cursor)? {
            DisplayRow::Row { id, cells } => {
                let label = cells
                    .iter()
                    .find(|cell| matches!(cell, Cell::Link { .. }))
                    .map(|cell| cell.label().to_string())
                    .unwrap_or_else(|| format!("#{id}"));
                Some((*id, label))
            }
            DisplayRow::Aggregate { .. } => None,
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.cursor = 0;
            return;
        }
        let max = self.rows.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(max);
    }

    fn move_column(&mut self, delta: isize) {
        let max = self.visible_count().saturating_sub(1);
        self.column = self.column.saturating_add_signed(delta).min(max);
    }

    fn click(&mut self, submetric: Option<StatsScope>, store: &CatalogStore) -> Option<String> {
        let (index, column) = self.current_column()?;
        let title = column.title.clone();
        if !column.sortable {
            return Some(format!("{title} is not sortable"));
        }
        let spec = self.model.click(index, submetric)?;
        store.sort::<R>(spec);
        self.refresh(store);
        let scope = match spec.scope {
            Some(StatsScope::Catalog) => " (catalog)",
            Some(StatsScope::Collection) => " (collection)",
            None => "",
        };
        debug!(table = self.title, column = %title, "sort changed");
        Some(format!("Sorted by {title}{scope}, {:?}", spec.direction))
    }

    fn hide_column(&mut self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        if self.visible_count() <= 1 {
            return Ok(Some("The last column cannot be hidden".to_string()));
        }
        let Some((_, column)) = self.current_column() else {
            return Ok(None);
        };
        let (field, title) = (column.field, column.title.clone());
        self.model.set_visibility(field, false);
        self.move_column(0);
        ctx.prefs
            .set_hidden_columns(self.scope, &self.model.hidden_titles())?;
        self.refresh(ctx.store);
        Ok(Some(format!("Hid {title}")))
    }

    fn show_all_columns(&mut self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        self.model.apply_hidden_titles::<&str>(&[]);
        ctx.prefs.set_hidden_columns::<&str>(self.scope, &[])?;
        self.refresh(ctx.store);
        Ok(Some("All columns shown".to_string()))
    }

    fn cycle_continent(&mut self, store: &CatalogStore) -> Option<String> {
        let snapshot = store.snapshot::<R>();
        let mut continents: Vec<u32> =
            snapshot.records.iter().filter_map(F::continent_of).collect();
        continents.sort_unstable();
        continents.dedup();
        let Some(continent) = self.filter.continent_mut() else {
            return Some("No continent filter on this screen".to_string());
        };
        *continent = next_continent(*continent, &continents);
        let label = match *continent {
            Some(id) => continent_name(store, id),
            None => "all".to_string(),
        };
        self.refresh(store);
        Some(format!("{}: continent {label}", self.title))
    }

    fn toggle_type(&mut self, index: usize, store: &CatalogStore) -> Option<String> {
        let Some(label) = F::type_labels().get(index).copied() else {
            return Some("No such type filter on this screen".to_string());
        };
        self.filter.toggle_type(index);
        debug!(table = self.title, kind = label, "type filter toggled");
        self.refresh(store);
        Some(format!("{}: {}", self.title, self.filter.describe()))
    }

    fn open_prompt(&mut self, range: YearRange) -> Option<String> {
        let label = F::range_label(range);
        let Some(current) = self.filter.range_mut(range).map(|dates| *dates) else {
            return Some("No year filter on this screen".to_string());
        };
        self.prompt = Some(RangePrompt::new(range, label, current));
        None
    }

    fn handle_prompt_key(&mut self, key: KeyEvent, store: &CatalogStore) -> Option<String> {
        let prompt = self.prompt.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.prompt = None;
                Some("Year filter unchanged".to_string())
            }
            KeyCode::Enter => {
                let Some(dates) = parse_year_range(&prompt.input) else {
                    return Some(format!("Not a year range: {}", prompt.input));
                };
                let range = prompt.range;
                self.prompt = None;
                if let Some(slot) = self.filter.range_mut(range) {
                    *slot = dates;
                }
                self.refresh(store);
                Some(format!("{}: {}", self.title, self.filter.describe()))
            }
            KeyCode::Backspace => {
                prompt.backspace();
                None
            }
            KeyCode::Char(ch) => {
                prompt.insert(ch);
                None
            }
            _ => None,
        }
    }

    fn render_prompt(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(prompt) = &self.prompt else {
            return;
        };
        let width = 44_u16.min(area.width);
        let height = 5_u16.min(area.height);
        let popup = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, popup);
        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(theme.accent)),
            Span::raw(prompt.input.clone()),
        ]);
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" apply  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel  blank clears"),
        ]);
        let paragraph = Paragraph::new(vec![input_line, Line::from(""), helper]).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} years (from-to)", prompt.label)),
        );
        frame.render_widget(paragraph, popup);
        let cursor_x = (popup.x + 3 + prompt.input.len() as u16)
            .min(popup.x + popup.width.saturating_sub(2));
        frame.set_cursor(cursor_x, popup.y + 1);
    }

    fn apply_filter_change(&mut self, changed: bool, store: &CatalogStore) -> Option<String> {
        if !changed {
            return Some("No lifecycle filter on this screen".to_string());
        }
        self.refresh(store);
        Some(format!("{}: {}", self.title, self.filter.describe()))
    }

    /// Visible column positions drawn this frame: pinned ones, then a scrolled window.
    fn displayed_columns(&mut self, width: u16) -> Vec<usize> {
        let widths: Vec<u16> = self
            .model
            .visible_columns()
            .map(|(_, column)| column_width(column))
            .collect();
        let pinned = self.model.pinned_count();
        if self.column >= pinned && self.column < pinned + self.scroll {
            self.scroll = self.column - pinned;
        }
        let pinned_width: u16 = widths[..pinned].iter().sum();
        if self.column >= pinned {
            while self.scroll < self.column - pinned {
                let window: u16 = widths[pinned + self.scroll..=self.column].iter().sum();
                if pinned_width + window <= width {
                    break;
                }
                self.scroll += 1;
            }
        }

        let mut displayed: Vec<usize> = (0..pinned).collect();
        let mut used = pinned_width;
        for position in pinned + self.scroll..widths.len() {
            if used + widths[position] > width && displayed.len() > pinned {
                break;
            }
            used += widths[position];
            displayed.push(position);
        }
        displayed
    }
}

fn column_width(column: &ColumnSpec<impl Copy>) -> u16 {
    let cells = if column.stats { 2 } else { 1 };
    (column.width + 1) * cells
}

fn arrow(sort: ColumnSort) -> &'static str {
    match sort {
        ColumnSort::Unsorted => "",
        ColumnSort::Asc => " ▲",
        ColumnSort::Desc => " ▼",
    }
}

fn pad(text: &str, width: u16, align: Align) -> String {
    let width = usize::from(width);
    match align {
        Align::Start => format!("{text:<width$}"),
        Align::Center => format!("{text:^width$}"),
        Align::End => format!("{text:>width$}"),
    }
}

fn continent_name(store: &CatalogStore, id: u32) -> String {
    store
        .records::<Territory>()
        .iter()
        .find(|territory| territory.continent.id == id)
        .map(|territory| territory.continent.name.clone())
        .unwrap_or_else(|| format!("#{id}"))
}

fn cell_text(cell: &Cell) -> &str {
    match cell {
        Cell::Image(Some(_)) => "⚑",
        other => other.label(),
    }
}

impl<R: Stored, F: ViewFilter<R>> View for TableView<R, F> {
    fn title(&self) -> &'static str {
        self.title
    }

    fn refresh(&mut self, store: &CatalogStore) {
        let snapshot = store.snapshot::<R>();
        let criteria = self.filter.criteria();
        let records = criteria.apply(snapshot.records.iter());
        let sorted = self.model.sort_spec().map(|spec| (spec.field, spec.scope));
        let rows: Result<Vec<DisplayRow>, TableError> = project(
            records,
            self.model.columns(),
            snapshot.stats.source(),
            sorted,
            self.aggregation.as_ref(),
        )
        .collect();
        match rows {
            Ok(rows) => {
                self.rows = rows;
                self.error = None;
            }
            Err(err) => {
                warn!(table = self.title, "cannot render table: {err}");
                self.rows.clear();
                self.error = Some(err);
            }
        }
        self.move_cursor(0);
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context<'_>) -> Result<Option<String>> {
        if self.prompt.is_some() {
            return Ok(self.handle_prompt_key(key, ctx.store));
        }
        let status = match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(1);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor(-1);
                None
            }
            KeyCode::PageDown => {
                self.move_cursor(20);
                None
            }
            KeyCode::PageUp => {
                self.move_cursor(-20);
                None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.cursor = 0;
                None
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.cursor = self.rows.len().saturating_sub(1);
                None
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.move_column(-1);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.move_column(1);
                None
            }
            KeyCode::Enter => self.click(None, ctx.store),
            KeyCode::Char('c') => self.click(Some(StatsScope::Catalog), ctx.store),
            KeyCode::Char('C') => self.click(Some(StatsScope::Collection), ctx.store),
            KeyCode::Char('v') => return self.hide_column(ctx),
            KeyCode::Char('V') => return self.show_all_columns(ctx),
            KeyCode::Char('e') => {
                let changed = self.filter.toggle_existing();
                self.apply_filter_change(changed, ctx.store)
            }
            KeyCode::Char('x') => {
                let changed = self.filter.toggle_extinct();
                self.apply_filter_change(changed, ctx.store)
            }
            KeyCode::Char('n') => self.cycle_continent(ctx.store),
            KeyCode::Char(digit @ '1'..='9') => {
                let index = digit as usize - '1' as usize;
                self.toggle_type(index, ctx.store)
            }
            KeyCode::Char('y') => self.open_prompt(YearRange::Start),
            KeyCode::Char('Y') => self.open_prompt(YearRange::End),
            KeyCode::Char('f') => match self.selected_row() {
                Some((id, label)) => {
                    let added = ctx.prefs.toggle_favorite(self.scope, id)?;
                    Some(if added {
                        format!("{label} added to favorites")
                    } else {
                        format!("{label} removed from favorites")
                    })
                }
                None => None,
            },
            KeyCode::Char(' ') => match self.selected_row() {
                Some((id, label)) => {
                    ctx.prefs.visit(self.scope, id)?;
                    let recent = ctx.prefs.history(self.scope).len();
                    Some(format!("Opened {label} ({recent} recent)"))
                }
                None => None,
            },
            _ => None,
        };
        Ok(status)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, prefs: &Preferences) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({} rows)", self.title, self.rows.len()));

        if let Some(err) = &self.error {
            let paragraph = Paragraph::new(vec![
                Line::from("This table cannot be displayed:"),
                Line::from(err.to_string()),
            ])
            .style(Style::default().fg(theme.danger))
            .block(block)
            .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let displayed = self.displayed_columns(area.width.saturating_sub(4));
        let visible: Vec<(usize, &ColumnSpec<R::Field>)> = self.model.visible_columns().collect();
        // First cell of each visible column within a projected row.
        let mut offsets = Vec::with_capacity(visible.len());
        let mut next = 0;
        for (_, column) in &visible {
            offsets.push(next);
            next += if column.stats { 2 } else { 1 };
        }

        let mut widths = vec![Constraint::Length(1)];
        let mut header = vec![String::new()];
        for &position in &displayed {
            let (index, column) = visible[position];
            let focused = position == self.column;
            let marker = if focused { "›" } else { "" };
            if column.stats {
                let catalog = self.model.submetric_sort(index, StatsScope::Catalog);
                let collection = self.model.submetric_sort(index, StatsScope::Collection);
                header.push(format!("{marker}{}{}", column.title, arrow(catalog)));
                header.push(format!("mine{}", arrow(collection)));
                widths.push(Constraint::Length(column.width));
                widths.push(Constraint::Length(column.width));
            } else {
                let sort = self.model.column_sort(index);
                header.push(format!("{marker}{}{}", column.title, arrow(sort)));
                widths.push(Constraint::Length(column.width));
            }
        }
        let header_cells = header.len();

        let favorites = prefs.favorites(self.scope);
        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|row| match row {
                DisplayRow::Row { id, cells } => {
                    let mut texts = vec![if favorites.contains(id) { "★" } else { " " }.to_string()];
                    for &position in &displayed {
                        let (_, column) = visible[position];
                        let count = if column.stats { 2 } else { 1 };
                        for cell in cells.iter().skip(offsets[position]).take(count) {
                            texts.push(pad(cell_text(cell), column.width, column.align));
                        }
                    }
                    Row::new(texts).style(Style::default().fg(theme.primary_fg))
                }
                DisplayRow::Aggregate { label, formatted, .. } => {
                    let mut texts = vec![String::new(); header_cells];
                    if header_cells > 1 {
                        texts[1] = format!("Σ {label}");
                        texts[header_cells - 1] = formatted.clone();
                    }
                    Row::new(texts).style(
                        Style::default()
                            .fg(theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )
                }
            })
            .collect();

        let table = Table::new(rows, widths)
            .header(
                Row::new(header).style(
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                ),
            )
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg)
                    .fg(theme.selection_fg),
            );
        self.table_state
            .select((!self.rows.is_empty()).then_some(self.cursor));
        frame.render_stateful_widget(table, area, &mut self.table_state);
        self.render_prompt(frame, area, theme);
    }

    fn capturing_input(&self) -> bool {
        self.prompt.is_some()
    }

    fn summary(&self, store: &CatalogStore) -> Option<Summary> {
        let summarize = self.summarize?;
        let snapshot = store.snapshot::<R>();
        let records = self.filter.criteria().apply(snapshot.records.iter());
        Some(summarize(&records, snapshot.stats.source()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banknotes_core::{
        models::{IssueYear, Link},
        table::{
            columns,
            fields::IssueYearField,
            summary::{territory_summary, TOTAL},
        },
    };
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn enter_resorts_the_store() -> Result<()> {
        let store = CatalogStore::new();
        store.replace(vec![
            IssueYear { id: 1, year: 1990 },
            IssueYear { id: 2, year: 1850 },
        ]);
        let mut prefs = Preferences::in_memory();
        let mut view: TableView<IssueYear, NoFilter> =
            TableView::new("Years", "years", columns::issue_year_table(), &store, &prefs);
        view.refresh(&store);

        let mut ctx = Context {
            store: &store,
            prefs: &mut prefs,
        };
        let status = view.handle_key(key(KeyCode::Enter), &mut ctx)?;
        assert!(status.is_some());
        assert_eq!(
            store.sort_spec::<IssueYear>(),
            banknotes_core::table::SortSpec::desc(IssueYearField::Year)
        );
        let years: Vec<i32> = store.records::<IssueYear>().iter().map(|y| y.year).collect();
        assert_eq!(years, vec![1990, 1850]);
        Ok(())
    }

    #[test]
    fn hidden_columns_are_saved_per_screen() -> Result<()> {
        let store = CatalogStore::new();
        let mut prefs = Preferences::in_memory();
        let mut view: TableView<Territory, TerritoryFilter> =
            TableView::new("Territories", "territories", columns::territory_table(), &store, &prefs);
        let mut ctx = Context {
            store: &store,
            prefs: &mut prefs,
        };
        view.handle_key(key(KeyCode::Char('l')), &mut ctx)?;
        view.handle_key(key(KeyCode::Char('v')), &mut ctx)?;
        let hidden = prefs.hidden_columns("territories").unwrap_or_default();
        assert!(hidden.contains(&"Name".to_string()));

        let restored: TableView<Territory, TerritoryFilter> =
            TableView::new("Territories", "territories", columns::territory_table(), &store, &prefs);
        assert!(restored.model.hidden_titles().contains(&"Name".to_string()));
        Ok(())
    }

    fn territory(
        id: u32,
        continent: (u32, &str),
        territory_type: TerritoryType,
        start: i32,
        end: Option<i32>,
    ) -> Territory {
        Territory {
            id,
            name: format!("T{id}"),
            iso3: None,
            continent: Link::new(continent.0, continent.1),
            territory_type,
            start,
            end,
            parent: None,
            flag: None,
        }
    }

    const EUROPE: (u32, &str) = (1, "Europe");
    const ASIA: (u32, &str) = (2, "Asia");

    fn territory_store() -> CatalogStore {
        let store = CatalogStore::new();
        store.replace(vec![
            territory(1, EUROPE, TerritoryType::Independent, 1800, None),
            territory(2, EUROPE, TerritoryType::Territory, 1900, Some(1960)),
            territory(3, ASIA, TerritoryType::Independent, 1950, None),
        ]);
        store
    }

    fn territory_overview(records: &[&Territory], stats: StatsSource<'_>) -> Summary {
        territory_summary(records.iter().copied(), stats)
    }

    fn territory_view(
        store: &CatalogStore,
        prefs: &Preferences,
    ) -> TableView<Territory, TerritoryFilter> {
        let table = columns::territory_table();
        let mut view = TableView::new("Territories", "territories", table, store, prefs)
            .with_summary(territory_overview);
        view.refresh(store);
        view
    }

    fn type_text<V: View>(view: &mut V, ctx: &mut Context<'_>, text: &str) -> Result<()> {
        for ch in text.chars() {
            view.handle_key(key(KeyCode::Char(ch)), ctx)?;
        }
        Ok(())
    }

    #[test]
    fn lifecycle_toggle_filters_rows() -> Result<()> {
        let store = territory_store();
        let mut prefs = Preferences::in_memory();
        let mut view = territory_view(&store, &prefs);
        assert_eq!(view.rows.len(), 3);

        let mut ctx = Context {
            store: &store,
            prefs: &mut prefs,
        };
        view.handle_key(key(KeyCode::Char('x')), &mut ctx)?;
        assert_eq!(view.rows.len(), 2);
        Ok(())
    }

    #[test]
    fn continent_cycle_narrows_rows_and_summary() -> Result<()> {
        let store = territory_store();
        let mut prefs = Preferences::in_memory();
        let mut view = territory_view(&store, &prefs);
        let before = view.summary(&store).and_then(|summary| summary.get(TOTAL));
        assert_eq!(before.map(|pair| pair.current.total), Some(2));
        assert_eq!(before.map(|pair| pair.extinct.total), Some(1));

        let mut ctx = Context {
            store: &store,
            prefs: &mut prefs,
        };
        let status = view.handle_key(key(KeyCode::Char('n')), &mut ctx)?;
        assert!(status.is_some_and(|text| text.contains("Europe")));
        assert_eq!(view.filter.continent, Some(EUROPE.0));
        assert_eq!(view.rows.len(), 2);
        let europe = view.summary(&store).and_then(|summary| summary.get(TOTAL));
        assert_eq!(europe.map(|pair| pair.current.total), Some(1));
        assert_eq!(europe.map(|pair| pair.extinct.total), Some(1));

        view.handle_key(key(KeyCode::Char('n')), &mut ctx)?;
        assert_eq!(view.filter.continent, Some(ASIA.0));
        assert_eq!(view.rows.len(), 1);

        let status = view.handle_key(key(KeyCode::Char('n')), &mut ctx)?;
        assert!(status.is_some_and(|text| text.contains("all")));
        assert_eq!(view.filter.continent, None);
        assert_eq!(view.rows.len(), 3);
        Ok(())
    }

    #[test]
    fn digit_keys_toggle_type_membership() -> Result<()> {
        let store = territory_store();
        let mut prefs = Preferences::in_memory();
        let mut view = territory_view(&store, &prefs);
        let mut ctx = Context {
            store: &store,
            prefs: &mut prefs,
        };

        view.handle_key(key(KeyCode::Char('1')), &mut ctx)?;
        assert!(!view.filter.types.contains(&TerritoryType::Independent));
        assert_eq!(view.rows.len(), 1);

        let status = view.handle_key(key(KeyCode::Char('9')), &mut ctx)?;
        assert_eq!(status.as_deref(), Some("No such type filter on this screen"));

        view.handle_key(key(KeyCode::Char('1')), &mut ctx)?;
        assert_eq!(view.rows.len(), 3);
        Ok(())
    }

    #[test]
    fn inverted_year_range_leaves_rows_unchanged() -> Result<()> {
        let store = territory_store();
        let mut prefs = Preferences::in_memory();
        let mut view = territory_view(&store, &prefs);
        let mut ctx = Context {
            store: &store,
            prefs: &mut prefs,
        };

        view.handle_key(key(KeyCode::Char('y')), &mut ctx)?;
        assert!(view.capturing_input());
        type_text(&mut view, &mut ctx, "2000-1990")?;
        let status = view.handle_key(key(KeyCode::Enter), &mut ctx)?;

        assert!(!view.capturing_input());
        assert_eq!(view.filter.founded, FilterDates::new(Some(2000), Some(1990)));
        assert_eq!(view.rows.len(), 3);
        assert!(status.is_some_and(|text| text.contains("ignored")));
        Ok(())
    }

    #[test]
    fn year_prompt_applies_and_cancels() -> Result<()> {
        let store = territory_store();
        let mut prefs = Preferences::in_memory();
        let mut view = territory_view(&store, &prefs);
        let mut ctx = Context {
            store: &store,
            prefs: &mut prefs,
        };

        view.handle_key(key(KeyCode::Char('y')), &mut ctx)?;
        type_text(&mut view, &mut ctx, "1850-")?;
        view.handle_key(key(KeyCode::Enter), &mut ctx)?;
        assert_eq!(view.filter.founded, FilterDates::new(Some(1850), None));
        assert_eq!(view.rows.len(), 2);

        // Prefilled with the current range; letters are not accepted.
        view.handle_key(key(KeyCode::Char('y')), &mut ctx)?;
        type_text(&mut view, &mut ctx, "q")?;
        assert_eq!(view.prompt.as_ref().map(|prompt| prompt.input.as_str()), Some("1850-"));
        let status = view.handle_key(key(KeyCode::Esc), &mut ctx)?;
        assert_eq!(status.as_deref(), Some("Year filter unchanged"));
        assert_eq!(view.filter.founded, FilterDates::new(Some(1850), None));

        view.handle_key(key(KeyCode::Char('Y')), &mut ctx)?;
        type_text(&mut view, &mut ctx, "1960")?;
        view.handle_key(key(KeyCode::Enter), &mut ctx)?;
        assert_eq!(view.filter.ended, FilterDates::new(Some(1960), Some(1960)));
        assert_eq!(view.rows.len(), 1);
        Ok(())
    }

    #[test]
    fn screens_without_filters_report_it() -> Result<()> {
        let store = CatalogStore::new();
        let mut prefs = Preferences::in_memory();
        let mut view: TableView<IssueYear, NoFilter> =
            TableView::new("Years", "years", columns::issue_year_table(), &store, &prefs);
        let mut ctx = Context {
            store: &store,
            prefs: &mut prefs,
        };
        let status = view.handle_key(key(KeyCode::Char('y')), &mut ctx)?;
        assert_eq!(status.as_deref(), Some("No year filter on this screen"));
        assert!(!view.capturing_input());
        let status = view.handle_key(key(KeyCode::Char('n')), &mut ctx)?;
        assert_eq!(status.as_deref(), Some("No continent filter on this screen"));
        Ok(())
    }

    #[test]
    fn year_range_parsing() {
        assert_eq!(parse_year_range("  "), Some(FilterDates::default()));
        assert_eq!(parse_year_range("1900-1950"), Some(FilterDates::new(Some(1900), Some(1950))));
        assert_eq!(parse_year_range("-1950"), Some(FilterDates::new(None, Some(1950))));
        assert_eq!(parse_year_range("1918"), Some(FilterDates::new(Some(1918), Some(1918))));
        assert_eq!(parse_year_range("19-18-17"), None);
    }

    #[test]
    fn continent_cycle_wraps_to_all() {
        let continents = [2, 5, 7];
        assert_eq!(next_continent(None, &continents), Some(2));
        assert_eq!(next_continent(Some(5), &continents), Some(7));
        assert_eq!(next_continent(Some(7), &continents), None);
        assert_eq!(next_continent(Some(9), &continents), None);
        assert_eq!(next_continent(None, &[]), None);
    }
}

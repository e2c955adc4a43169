use std::{io, thread, time::Duration};

use anyhow::{Context as _, Result};
use banknotes_core::{
    models::{CollectionItem, Currency, Denomination, IssueYear, Territory},
    preferences::Preferences,
    repository::{BootStatus, CatalogStore, DataKind, LoadState, SyncEvent},
    table::{
        columns,
        fields::CollectionField,
        filter::NoFilter,
        stats::StatsSource,
        summary::{currency_summary, territory_summary, Data, Summary},
        CollectionFilter, CurrencyFilter, TerritoryFilter,
    },
};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::view::{Context, TableView, View};

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary_fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

fn territory_overview(records: &[&Territory], stats: StatsSource<'_>) -> Summary {
    territory_summary(records.iter().copied(), stats)
}

fn currency_overview(records: &[&Currency], stats: StatsSource<'_>) -> Summary {
    currency_summary(records.iter().copied(), stats)
}

fn build_views(store: &CatalogStore, prefs: &Preferences) -> Vec<Box<dyn View>> {
    vec![
        Box::new(
            TableView::<Territory, TerritoryFilter>::new(
                "Territories",
                "territories",
                columns::territory_table(),
                store,
                prefs,
            )
            .with_summary(territory_overview),
        ),
        Box::new(
            TableView::<Currency, CurrencyFilter>::new(
                "Currencies",
                "currencies",
                columns::currency_table(),
                store,
                prefs,
            )
            .with_summary(currency_overview),
        ),
        Box::new(TableView::<Denomination, NoFilter>::new(
            "Denominations",
            "denominations",
            columns::denomination_table(),
            store,
            prefs,
        )),
        Box::new(TableView::<IssueYear, NoFilter>::new(
            "Issue years",
            "issue_years",
            columns::issue_year_table(),
            store,
            prefs,
        )),
        Box::new(
            TableView::<CollectionItem, CollectionFilter>::new(
                "Collection",
                "collection",
                columns::collection_table(),
                store,
                prefs,
            )
            .with_aggregation(CollectionField::aggregation()),
        ),
    ]
}

/// Terminal frontend over a [`CatalogStore`].
pub struct CatalogApp {
    store: CatalogStore,
    prefs: Preferences,
    views: Vec<Box<dyn View>>,
    active: usize,
    overlay: bool,
    status: String,
    boot: Option<BootStatus>,
    should_quit: bool,
    sync_rx: Option<mpsc::Receiver<SyncEvent>>,
    theme: Theme,
}

impl CatalogApp {
    pub fn new(store: CatalogStore, prefs: Preferences) -> Self {
        let views = build_views(&store, &prefs);
        Self {
            store,
            prefs,
            views,
            active: 0,
            overlay: false,
            status: "Loading catalog…".to_string(),
            boot: None,
            should_quit: false,
            sync_rx: None,
            theme: Theme::default(),
        }
    }

    pub fn attach_sync(&mut self, receiver: mpsc::Receiver<SyncEvent>) {
        self.sync_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        self.refresh_views();

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let mut sync_rx = self.sync_rx.take();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            if let Some(rx) = sync_rx.as_mut() {
                let mut sync_closed = false;
                tokio::select! {
                    maybe_event = event_rx.recv() => {
                        if !self.process_app_event(maybe_event) {
                            break;
                        }
                    }
                    maybe_sync = rx.recv() => {
                        match maybe_sync {
                            Some(event) => self.handle_sync_event(event),
                            None => sync_closed = true,
                        }
                    }
                }
                if sync_closed {
                    sync_rx = None;
                }
            } else {
                let maybe_event = event_rx.recv().await;
                if !self.process_app_event(maybe_event) {
                    break;
                }
            }

            if self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn refresh_views(&mut self) {
        for view in &mut self.views {
            view.refresh(&self.store);
        }
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn handle_sync_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Loaded { kind, count } => {
                info!(kind = kind.label(), count, "dataset ready");
                self.refresh_views();
                self.set_status(format!("Loaded {count} {}", kind.label()));
            }
            SyncEvent::Failed { kind, error } => {
                error!(kind = kind.label(), %error, "dataset failed");
                self.set_status(format!("Failed to load {}: {error}", kind.label()));
            }
            SyncEvent::Finished(status) => {
                if status.connection_error() {
                    warn!(failed = ?status.failed, "catalog unavailable");
                    self.set_status("Connection error: the catalog could not be loaded".to_string());
                } else if status.failed.is_empty() {
                    self.set_status(format!("Catalog ready at {}", Local::now().format("%H:%M")));
                } else {
                    self.set_status(format!("Catalog ready; {} optional datasets failed", status.failed.len()));
                }
                self.boot = Some(status);
            }
        }
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    error!(?err, "input handling failed");
                    self.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => true,
            None => false,
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if self.handle_global_shortcut(&key) {
            return Ok(());
        }
        if self.overlay {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('o')) {
                self.overlay = false;
            }
            return Ok(());
        }

        let mut ctx = Context {
            store: &self.store,
            prefs: &mut self.prefs,
        };
        let Some(view) = self.views.get_mut(self.active) else {
            return Ok(());
        };
        if let Some(message) = view.handle_key(key, &mut ctx)? {
            self.status = message;
        }
        Ok(())
    }

    fn handle_global_shortcut(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return true;
        }
        let typing = self
            .views
            .get(self.active)
            .is_some_and(|view| view.capturing_input());
        if typing {
            return false;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.switch_view(1),
            KeyCode::BackTab => self.switch_view(-1),
            KeyCode::Char('o') if !self.overlay => self.toggle_overlay(),
            _ => return false,
        }
        true
    }

    fn switch_view(&mut self, delta: isize) {
        let count = self.views.len() as isize;
        if count == 0 {
            return;
        }
        self.active = (self.active as isize + delta).rem_euclid(count) as usize;
        self.overlay = false;
    }

    fn toggle_overlay(&mut self) {
        match self.views.get(self.active) {
            Some(view) if view.summary(&self.store).is_some() => self.overlay = true,
            Some(view) => self.set_status(format!("No statistics overview for {}", view.title())),
            None => {}
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(4),
            ])
            .split(size);

        self.render_tabs(frame, chunks[0]);
        if let Some(view) = self.views.get_mut(self.active) {
            view.render(frame, chunks[1], &self.theme, &self.prefs);
        }
        self.render_status(frame, chunks[2]);
        if self.overlay {
            self.render_overlay(frame, size);
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = self.views.iter().map(|view| Line::from(view.title())).collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("Banknote catalog"))
            .select(self.active)
            .style(Style::default().fg(self.theme.muted))
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let mut datasets = Vec::new();
        if self.boot.as_ref().is_some_and(BootStatus::connection_error) {
            datasets.push(Span::styled(
                "CONNECTION ERROR ",
                Style::default()
                    .fg(self.theme.danger)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        for kind in DataKind::ALL {
            let (mark, color) = match self.store.state(kind) {
                LoadState::Pending => ("…", self.theme.muted),
                LoadState::Loaded { .. } => ("✓", self.theme.success),
                LoadState::Failed(_) => ("✗", self.theme.danger),
                LoadState::Skipped => ("–", self.theme.warning),
            };
            datasets.push(Span::styled(
                format!("{} {mark}  ", kind.label()),
                Style::default().fg(color),
            ));
        }
        let help = Line::from(Span::styled(
            "Tab screens  h/l column  Enter/c/C sort  v/V columns  e/x/n/1-4 filter  y/Y years  f favorite  o overview  q quit",
            Style::default().fg(self.theme.muted),
        ));
        let paragraph = Paragraph::new(vec![
            Line::from(self.status.clone()),
            Line::from(datasets),
            help,
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_overlay(&self, frame: &mut Frame, size: Rect) {
        let Some(view) = self.views.get(self.active) else {
            return;
        };
        let Some(summary) = view.summary(&self.store) else {
            return;
        };
        let area = centered_rect(78, summary.rows.len() as u16 + 5, size);
        frame.render_widget(Clear, area);

        let header = Row::new(vec![
            "", "Current", "Collected", "Issuers", "Extinct", "Collected", "Issuers",
        ])
        .style(
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        );
        let counts = |data: Data| {
            [
                format!("{:>7}", data.total),
                format!("{:>9}", data.collection),
                format!("{:>7}", data.issuer),
            ]
        };
        let rows: Vec<Row> = summary
            .rows
            .iter()
            .map(|(label, pair)| {
                let mut cells = vec![label.clone()];
                cells.extend(counts(pair.current));
                cells.extend(counts(pair.extinct));
                Row::new(cells)
            })
            .collect();
        let widths = [
            Constraint::Length(22),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(7),
        ];
        let table = Table::new(rows, widths).header(header).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} overview (o/Esc to close)", view.title())),
        );
        frame.render_widget(table, area);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use banknotes_core::models::Link;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn tab_cycles_screens_both_ways() -> Result<()> {
        let mut app = CatalogApp::new(CatalogStore::new(), Preferences::in_memory());
        app.handle_input(press(KeyCode::BackTab))?;
        assert_eq!(app.views[app.active].title(), "Collection");
        app.handle_input(press(KeyCode::Tab))?;
        assert_eq!(app.views[app.active].title(), "Territories");
        Ok(())
    }

    #[test]
    fn open_year_prompt_keeps_global_keys() -> Result<()> {
        let mut app = CatalogApp::new(CatalogStore::new(), Preferences::in_memory());
        app.handle_input(press(KeyCode::Char('y')))?;
        app.handle_input(press(KeyCode::Char('q')))?;
        app.handle_input(press(KeyCode::Tab))?;
        assert!(!app.should_quit);
        assert_eq!(app.views[app.active].title(), "Territories");

        app.handle_input(press(KeyCode::Esc))?;
        app.handle_input(press(KeyCode::Char('q')))?;
        assert!(app.should_quit);
        Ok(())
    }

    #[test]
    fn sync_events_update_status_and_boot_state() {
        let store = CatalogStore::new();
        store.replace(vec![Territory {
            id: 1,
            name: "Spain".to_string(),
            iso3: Some("ESP".to_string()),
            continent: Link::new(1, "Europe"),
            territory_type: banknotes_core::TerritoryType::Independent,
            start: 1479,
            end: None,
            parent: None,
            flag: None,
        }]);
        let mut app = CatalogApp::new(store, Preferences::in_memory());
        app.handle_sync_event(SyncEvent::Loaded {
            kind: DataKind::Territories,
            count: 1,
        });
        assert_eq!(app.status, "Loaded 1 territories");

        app.handle_sync_event(SyncEvent::Finished(BootStatus {
            failed: vec![DataKind::TerritoryStats],
        }));
        assert!(app.status.starts_with("Connection error"));
        assert!(app.boot.as_ref().is_some_and(BootStatus::connection_error));
    }

    #[test]
    fn overlay_only_opens_on_screens_with_summaries() -> Result<()> {
        let mut app = CatalogApp::new(CatalogStore::new(), Preferences::in_memory());
        app.handle_input(press(KeyCode::Char('o')))?;
        assert!(app.overlay);
        app.handle_input(press(KeyCode::Esc))?;
        assert!(!app.overlay);

        app.handle_input(press(KeyCode::Tab))?;
        app.handle_input(press(KeyCode::Tab))?;
        app.handle_input(press(KeyCode::Char('o')))?;
        assert!(!app.overlay);
        assert!(app.status.contains("Denominations"));
        Ok(())
    }
}

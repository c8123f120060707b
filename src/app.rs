use std::time::Duration;

use chrono::{Local, TimeDelta};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;
use tracing::debug;

use crate::components::Component;
use crate::components::approval_form::ApprovalForm;
use crate::components::event_table::EventTable;
use crate::components::header::Header;
use crate::components::status_bar::StatusBar;
use crate::coordinator::{Coordinator, WritePhase};
use crate::data::types::{ContractName, EventName};
use crate::events::AppEvent;
use crate::theme::THEME;

/// How often the head block number is re-read.
const HEAD_REFRESH: Duration = Duration::from_secs(4);

/// Seconds a notification stays in the status bar.
const NOTIFICATION_TTL_SECS: i64 = 8;

/// Which panel receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Form,
    Table(usize),
}

impl Focus {
    fn next(self, tables: usize) -> Self {
        match self {
            Focus::Form if tables > 0 => Focus::Table(0),
            Focus::Table(i) if i + 1 < tables => Focus::Table(i + 1),
            _ => Focus::Form,
        }
    }

    fn prev(self, tables: usize) -> Self {
        match self {
            Focus::Form if tables > 0 => Focus::Table(tables - 1),
            Focus::Table(0) | Focus::Form => Focus::Form,
            Focus::Table(i) => Focus::Table(i - 1),
        }
    }
}

pub struct App {
    // Components
    header: Header,
    status_bar: StatusBar,
    form: ApprovalForm,
    tables: Vec<EventTable>,
    focus: Focus,

    // Data
    coordinator: Coordinator,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn new(
        coordinator: Coordinator,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        tick_rate_ms: u64,
        explorer_url: Option<String>,
    ) -> Self {
        let mut header = Header::new();
        header.dex = coordinator
            .client()
            .contract(ContractName::Dex)
            .map(|c| c.address);
        header.token = coordinator
            .client()
            .contract(ContractName::Balloons)
            .map(|c| c.address);

        let tables = EventName::ALL
            .iter()
            .map(|event| EventTable::new(*event, explorer_url.clone()))
            .collect();

        let mut app = Self {
            header,
            status_bar: StatusBar::new(),
            form: ApprovalForm::new(),
            tables,
            focus: Focus::Form,
            coordinator,
            event_rx,
            should_quit: false,
            tick_rate: Duration::from_millis(tick_rate_ms),
        };
        app.sync();
        app
    }

    pub async fn run(&mut self, mut terminal: ratatui::DefaultTerminal) -> color_eyre::Result<()> {
        // Initial data load
        self.coordinator.start();
        self.sync();

        let mut interval = tokio::time::interval(self.tick_rate);
        let mut head_interval = tokio::time::interval(HEAD_REFRESH);
        // The first tick fires immediately and start() already asked for the head.
        head_interval.tick().await;
        let mut events = EventStream::new();

        while !self.should_quit {
            tokio::select! {
                _ = interval.tick() => {
                    self.expire_notification();
                    terminal.draw(|frame| self.render(frame))?;
                }
                _ = head_interval.tick() => {
                    self.coordinator.refresh_head();
                }
                Some(Ok(event)) = events.next() => {
                    self.handle_terminal_event(event);
                }
                Some(app_event) = self.event_rx.recv() => {
                    self.handle_app_event(app_event);
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Fill background
        frame.render_widget(
            Block::default().style(Style::default().bg(THEME.bg)),
            area,
        );

        // Layout: header (1) | form (3) | approvals | 2x2 DEX grid | status bar (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Percentage(30),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.render(frame, chunks[0]);

        let submit_enabled = self.coordinator.submit_enabled();
        self.form
            .render(frame, chunks[1], &self.coordinator.approval().amount, submit_enabled);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[3]);
        let mut areas = vec![chunks[2]];
        for row in rows.iter() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row);
            areas.extend(cells.iter().copied());
        }
        for (table, area) in self.tables.iter_mut().zip(areas) {
            table.render(frame, area);
        }

        self.status_bar.render(frame, chunks[4]);
    }

    fn handle_terminal_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        // Only handle key press events (not release/repeat) for cross-platform compat
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => {
                self.set_focus(self.focus.next(self.tables.len()));
                return;
            }
            KeyCode::BackTab => {
                self.set_focus(self.focus.prev(self.tables.len()));
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Form => self.handle_form_key(key),
            Focus::Table(index) => match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('a') => self.set_focus(Focus::Form),
                _ => {
                    let app_event = self
                        .tables
                        .get_mut(index)
                        .and_then(|table| table.handle_key(key));
                    if let Some(event) = app_event {
                        self.handle_app_event(event);
                    }
                }
            },
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.set_focus(Focus::Table(0));
            return;
        }
        if self.form.handle_key(key, self.coordinator.amount_mut()) {
            self.status_bar.notification = None;
            self.coordinator.submit_approval();
            self.sync();
        }
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.form.focused = focus == Focus::Form;
        self.status_bar.form_focused = focus == Focus::Form;
        for (i, table) in self.tables.iter_mut().enumerate() {
            table.focused = focus == Focus::Table(i);
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        let Some(event) = self.coordinator.handle_event(event) else {
            self.sync();
            return;
        };

        match event {
            AppEvent::Connected(chain_id) => {
                self.header.chain_id = chain_id;
                self.header.connected = true;
                self.status_bar.connected = true;
            }
            AppEvent::LatestBlockNumber(number) => {
                self.header.latest_block = number;
                self.status_bar.latest_block = number;
                self.header.connected = true;
                self.status_bar.connected = true;
            }
            AppEvent::Refetch(event) => {
                debug!(%event, "manual refetch");
                self.coordinator.refetch(event);
            }
            AppEvent::Notify(notification) => {
                self.status_bar.notification = Some(notification);
            }
            // Owned by the coordinator and never handed back.
            AppEvent::ContractResolved { .. }
            | AppEvent::StreamSettled { .. }
            | AppEvent::WriteSettled { .. } => {}
        }
        self.sync();
    }

    /// Copy stream snapshots into the tables. Records are shared, not cloned.
    fn sync(&mut self) {
        for table in &mut self.tables {
            table.set_state(self.coordinator.stream(table.event).cloned());
        }
        self.status_bar.loading = self
            .coordinator
            .streams()
            .iter()
            .filter(|s| s.loading())
            .count();
        self.status_bar.write_status = match self.coordinator.phase() {
            WritePhase::Idle => None,
            WritePhase::Submitting(_) => Some("Waiting for the approval to be mined..."),
            WritePhase::Refreshing(_) => Some("Refreshing approvals..."),
        };
        if let Some(spender) = self.coordinator.approval().spender {
            self.header.dex = Some(spender);
        }
    }

    fn expire_notification(&mut self) {
        let expired = self
            .status_bar
            .notification
            .as_ref()
            .is_some_and(|n| Local::now() - n.at > TimeDelta::seconds(NOTIFICATION_TTL_SECS));
        if expired {
            self.status_bar.notification = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_cycles_forward() {
        let mut focus = Focus::Form;
        let mut seen = Vec::new();
        for _ in 0..7 {
            focus = focus.next(5);
            seen.push(focus);
        }
        assert_eq!(
            seen,
            vec![
                Focus::Table(0),
                Focus::Table(1),
                Focus::Table(2),
                Focus::Table(3),
                Focus::Table(4),
                Focus::Form,
                Focus::Table(0),
            ]
        );
    }

    #[test]
    fn test_focus_cycles_backward() {
        assert_eq!(Focus::Form.prev(5), Focus::Table(4));
        assert_eq!(Focus::Table(0).prev(5), Focus::Form);
        assert_eq!(Focus::Table(3).prev(5), Focus::Table(2));
    }

    #[test]
    fn test_focus_without_tables_stays_on_form() {
        assert_eq!(Focus::Form.next(0), Focus::Form);
        assert_eq!(Focus::Form.prev(0), Focus::Form);
    }
}

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::events::{Notification, NotifyLevel};
use crate::theme::THEME;
use crate::utils;

pub struct StatusBar {
    pub connected: bool,
    pub latest_block: u64,
    pub notification: Option<Notification>,
    /// Streams with a fetch in flight.
    pub loading: usize,
    /// Progress of the approval write, if one is underway.
    pub write_status: Option<&'static str>,
    pub form_focused: bool,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            connected: false,
            latest_block: 0,
            notification: None,
            loading: 0,
            write_status: None,
            form_focused: true,
        }
    }

    fn hints(&self) -> Line<'static> {
        let mut keys: Vec<(&str, &str)> = if self.form_focused {
            vec![("Enter", ":Approve  "), ("Esc", ":Tables  ")]
        } else {
            vec![
                ("\u{2191}\u{2193}", ":Select  "),
                ("r", ":Refetch  "),
                ("a", ":Amount  "),
                ("q", ":Quit  "),
            ]
        };
        keys.push(("Tab", ":Next panel"));

        let mut spans = vec![Span::raw(" ")];
        for (key, label) in keys {
            spans.push(Span::styled(key.to_string(), THEME.accent_style()));
            spans.push(Span::styled(label.to_string(), THEME.muted_style()));
        }
        Line::from(spans)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let bg = Block::default().style(THEME.header_style());
        frame.render_widget(bg, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(area);

        // --- Left side: notification, else write progress, else loading, else key hints ---
        let left_content = if let Some(ref note) = self.notification {
            let (marker, style) = match note.level {
                NotifyLevel::Success => (" \u{2713} ", THEME.success_style()),
                NotifyLevel::Error => (" ! ", THEME.error_style()),
            };
            Line::from(vec![
                Span::styled(marker, style.add_modifier(Modifier::BOLD)),
                Span::styled(note.at.format("%H:%M:%S ").to_string(), THEME.muted_style()),
                Span::styled(note.message.clone(), Style::default().fg(THEME.warning)),
            ])
        } else if let Some(status) = self.write_status {
            Line::from(Span::styled(
                format!(" {status}"),
                Style::default().fg(THEME.text_accent),
            ))
        } else if self.loading > 0 {
            Line::from(Span::styled(
                format!(" Loading {} event stream(s)...", self.loading),
                Style::default().fg(THEME.text_accent),
            ))
        } else {
            self.hints()
        };

        let left = Paragraph::new(left_content).style(THEME.header_style());
        frame.render_widget(left, chunks[0]);

        // --- Right side: connection status + block number ---
        let (dot_color, status_text) = if self.connected {
            (THEME.success, "Connected")
        } else {
            (THEME.error, "Disconnected")
        };

        let block_str = utils::format_number(self.latest_block);

        let right_content = Line::from(vec![
            Span::styled("\u{25cf} ", Style::default().fg(dot_color)),
            Span::styled(status_text, Style::default().fg(dot_color)),
            Span::styled(" | ", THEME.muted_style()),
            Span::styled(format!("#{block_str} "), THEME.accent_style()),
        ]);

        let right = Paragraph::new(right_content)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(right, chunks[1]);
    }
}

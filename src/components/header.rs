use alloy::primitives::Address;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;
use crate::utils;

pub struct Header {
    pub chain_id: u64,
    pub latest_block: u64,
    pub connected: bool,
    pub dex: Option<Address>,
    pub token: Option<Address>,
}

impl Header {
    pub fn new() -> Self {
        Self {
            chain_id: 0,
            latest_block: 0,
            connected: false,
            dex: None,
            token: None,
        }
    }

    fn display_chain_name(&self) -> &str {
        match self.chain_id {
            1 => "Mainnet",
            11155111 => "Sepolia",
            31337 => "Localhost",
            _ => "Chain",
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header_block = Block::default().style(THEME.header_style());
        frame.render_widget(header_block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(13),
                Constraint::Min(0),
                Constraint::Length(32),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(
            " dex-events",
            Style::default()
                .fg(THEME.text_accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(THEME.header_style());
        frame.render_widget(title, chunks[0]);

        let addr = |a: Option<Address>| {
            a.map(|a| utils::truncate_address(&a))
                .unwrap_or_else(|| "-".to_string())
        };
        let contracts = Line::from(vec![
            Span::styled("DEX ", THEME.muted_style()),
            Span::styled(addr(self.dex), THEME.address_style()),
            Span::styled("  Balloons ", THEME.muted_style()),
            Span::styled(addr(self.token), THEME.address_style()),
        ]);
        frame.render_widget(
            Paragraph::new(contracts).style(THEME.header_style()),
            chunks[1],
        );

        let block_str = utils::format_number(self.latest_block);
        let network_info = Line::from(vec![
            Span::styled(
                format!("{} ({})", self.display_chain_name(), self.chain_id),
                Style::default().fg(THEME.text),
            ),
            Span::styled(" | ", THEME.muted_style()),
            Span::styled(format!("#{block_str} "), THEME.accent_style()),
        ]);
        let network_paragraph = Paragraph::new(network_info)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(network_paragraph, chunks[2]);
    }
}

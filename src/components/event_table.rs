use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::stream::StreamState;
use crate::data::types::{EventName, EventRecord};
use crate::events::AppEvent;
use crate::theme::THEME;
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Address,
    Amount,
}

#[derive(Debug, Clone, Copy)]
struct Column {
    header: &'static str,
    arg: &'static str,
    kind: ColumnKind,
}

const fn address(header: &'static str, arg: &'static str) -> Column {
    Column {
        header,
        arg,
        kind: ColumnKind::Address,
    }
}

const fn amount(header: &'static str, arg: &'static str) -> Column {
    Column {
        header,
        arg,
        kind: ColumnKind::Amount,
    }
}

const APPROVAL_COLUMNS: &[Column] = &[
    address("Owner", "owner"),
    address("Spender", "spender"),
    amount("Amount", "value"),
];

const ETH_TO_TOKEN_COLUMNS: &[Column] = &[
    address("Address", "swapper"),
    amount("Amount of ETH In", "ethInput"),
    amount("Amount of Balloons Out", "tokenOutput"),
];

const TOKEN_TO_ETH_COLUMNS: &[Column] = &[
    address("Address", "swapper"),
    amount("Amount of Balloons In", "tokensInput"),
    amount("Amount of ETH Out", "ethOutput"),
];

const LIQUIDITY_PROVIDED_COLUMNS: &[Column] = &[
    address("Address", "liquidityProvider"),
    amount("Amount of ETH In", "ethInput"),
    amount("Amount of Balloons In", "tokensInput"),
    amount("Liquidity Minted", "liquidityMinted"),
];

const LIQUIDITY_REMOVED_COLUMNS: &[Column] = &[
    address("Address", "liquidityRemover"),
    amount("Amount of ETH Out", "ethOutput"),
    amount("Amount of Balloons Out", "tokensOutput"),
    amount("Liquidity Withdrawn", "liquidityWithdrawn"),
];

fn columns(event: EventName) -> &'static [Column] {
    match event {
        EventName::Approval => APPROVAL_COLUMNS,
        EventName::EthToTokenSwap => ETH_TO_TOKEN_COLUMNS,
        EventName::TokenToEthSwap => TOKEN_TO_ETH_COLUMNS,
        EventName::LiquidityProvided => LIQUIDITY_PROVIDED_COLUMNS,
        EventName::LiquidityRemoved => LIQUIDITY_REMOVED_COLUMNS,
    }
}

fn title(event: EventName) -> &'static str {
    match event {
        EventName::Approval => "Token Approval Events",
        EventName::EthToTokenSwap => "ETH To Balloons Events",
        EventName::TokenToEthSwap => "Balloons To ETH Events",
        EventName::LiquidityProvided => "Liquidity Provided Events",
        EventName::LiquidityRemoved => "Liquidity Removed Events",
    }
}

fn empty_message(event: EventName) -> &'static str {
    match event {
        EventName::Approval => "No approval events found",
        _ => "No events found",
    }
}

/// Cell text for one record. Missing amounts show as zero, missing addresses as "-".
fn row_cells(event: EventName, record: &EventRecord) -> Vec<String> {
    columns(event)
        .iter()
        .map(|col| match col.kind {
            ColumnKind::Address => record
                .address(col.arg)
                .map(|a| utils::truncate_address(&a))
                .unwrap_or_else(|| "-".to_string()),
            ColumnKind::Amount => utils::format_amount(record.uint(col.arg).unwrap_or_default()),
        })
        .collect()
}

/// Full identifiers for the selected row, with explorer links when configured.
fn detail_line(event: EventName, record: &EventRecord, explorer_url: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(col) = columns(event).iter().find(|c| c.kind == ColumnKind::Address) {
        if let Some(addr) = record.address(col.arg) {
            match explorer_url {
                Some(base) => parts.push(utils::explorer_link(base, "address", &addr.to_string())),
                None => parts.push(addr.to_string()),
            }
        }
    }
    if let Some(hash) = record.transaction_hash {
        match explorer_url {
            Some(base) => parts.push(utils::explorer_link(base, "tx", &hash.to_string())),
            None => parts.push(format!("tx {}", utils::truncate_hash(&hash))),
        }
    }
    if let Some(block) = record.block_number {
        parts.push(format!("block #{}", utils::format_number(block)));
    }
    parts.join("  ")
}

/// One read-only table bound to a single event stream.
pub struct EventTable {
    pub event: EventName,
    pub state: Option<StreamState>,
    pub focused: bool,
    explorer_url: Option<String>,
    table_state: TableState,
}

impl EventTable {
    pub fn new(event: EventName, explorer_url: Option<String>) -> Self {
        Self {
            event,
            state: None,
            focused: false,
            explorer_url,
            table_state: TableState::default(),
        }
    }

    fn records(&self) -> &[EventRecord] {
        self.state.as_ref().map(|s| s.records()).unwrap_or(&[])
    }

    /// Keep the selection inside the current record set after a swap.
    pub fn set_state(&mut self, state: Option<StreamState>) {
        self.state = state;
        let len = self.records().len();
        match self.table_state.selected() {
            Some(_) if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            _ => {}
        }
    }

    fn select_next(&mut self) {
        let len = self.records().len();
        if len == 0 {
            return;
        }
        let next = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.table_state.select(Some(next));
    }

    fn select_prev(&mut self) {
        if self.records().is_empty() {
            return;
        }
        let prev = self.table_state.selected().unwrap_or(0).saturating_sub(1);
        self.table_state.select(Some(prev));
    }

    fn block_title(&self) -> Line<'static> {
        let mut spans = vec![Span::raw(format!(" {} ", title(self.event)))];
        if let Some(state) = &self.state {
            if state.loading() {
                spans.push(Span::styled("loading... ", THEME.accent_style()));
            } else if let Some(head) = state.head() {
                spans.push(Span::styled(
                    format!("({}) @#{} ", state.records().len(), utils::format_number(head)),
                    THEME.muted_style(),
                ));
            }
        }
        Line::from(spans)
    }
}

impl Component for EventTable {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                None
            }
            KeyCode::Char('g') => {
                if !self.records().is_empty() {
                    self.table_state.select(Some(0));
                }
                None
            }
            KeyCode::Char('G') => {
                let len = self.records().len();
                if len > 0 {
                    self.table_state.select(Some(len - 1));
                }
                None
            }
            KeyCode::Char('r') => Some(AppEvent::Refetch(self.event)),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(self.block_title())
            .borders(Borders::ALL)
            .border_style(THEME.panel_border(self.focused));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(state) = self.state.as_ref() else {
            return;
        };

        if state.loading() && !state.settled_once() {
            let loading = Paragraph::new("Loading...")
                .style(THEME.accent_style())
                .alignment(Alignment::Center);
            frame.render_widget(loading, inner);
            return;
        }

        if state.records().is_empty() {
            let mut lines = vec![Line::from(Span::styled(
                empty_message(self.event),
                THEME.muted_style(),
            ))];
            if let Some(err) = state.last_error() {
                lines.push(Line::from(Span::styled(
                    format!("last fetch failed: {err}"),
                    THEME.error_style(),
                )));
            }
            let empty = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(empty, inner);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        let cols = columns(self.event);
        let header = Row::new(cols.iter().map(|c| Cell::from(c.header)))
            .style(THEME.table_header_style());
        let rows: Vec<Row> = state
            .records()
            .iter()
            .map(|record| {
                let cells = row_cells(self.event, record)
                    .into_iter()
                    .zip(cols)
                    .map(|(text, col)| {
                        let style = match col.kind {
                            ColumnKind::Address => THEME.address_style(),
                            ColumnKind::Amount => THEME.amount_style(),
                        };
                        Cell::from(text).style(style)
                    });
                Row::new(cells)
            })
            .collect();
        let widths: Vec<Constraint> = cols
            .iter()
            .map(|c| match c.kind {
                ColumnKind::Address => Constraint::Length(16),
                ColumnKind::Amount => Constraint::Min(12),
            })
            .collect();

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(THEME.selected_style())
            .highlight_symbol(" > ");
        frame.render_stateful_widget(table, chunks[0], &mut self.table_state);

        let detail = self
            .table_state
            .selected()
            .and_then(|i| state.records().get(i))
            .map(|record| detail_line(self.event, record, self.explorer_url.as_deref()))
            .unwrap_or_default();
        frame.render_widget(
            Paragraph::new(Span::styled(detail, THEME.hash_style())),
            chunks[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use alloy::primitives::{Address, B256, U256};

    use crate::data::types::ArgValue;

    fn approval(value: Option<U256>) -> EventRecord {
        let mut args = BTreeMap::new();
        args.insert(
            "owner".to_string(),
            ArgValue::Address(Address::repeat_byte(0x11)),
        );
        args.insert(
            "spender".to_string(),
            ArgValue::Address(Address::repeat_byte(0x22)),
        );
        if let Some(value) = value {
            args.insert("value".to_string(), ArgValue::Uint(value));
        }
        EventRecord {
            event: EventName::Approval,
            args,
            block_number: Some(1234),
            transaction_hash: Some(B256::repeat_byte(0xab)),
            log_index: Some(0),
        }
    }

    #[test]
    fn test_column_sets() {
        assert_eq!(columns(EventName::Approval).len(), 3);
        assert_eq!(columns(EventName::EthToTokenSwap).len(), 3);
        assert_eq!(columns(EventName::TokenToEthSwap).len(), 3);
        assert_eq!(columns(EventName::LiquidityProvided).len(), 4);
        assert_eq!(columns(EventName::LiquidityRemoved).len(), 4);
        for event in EventName::ALL {
            assert_eq!(columns(event)[0].kind, ColumnKind::Address);
        }
    }

    #[test]
    fn test_column_headers() {
        let headers = |event| columns(event).iter().map(|c| c.header).collect::<Vec<_>>();
        assert_eq!(headers(EventName::Approval), vec!["Owner", "Spender", "Amount"]);
        assert_eq!(
            headers(EventName::EthToTokenSwap),
            vec!["Address", "Amount of ETH In", "Amount of Balloons Out"]
        );
        assert_eq!(
            headers(EventName::TokenToEthSwap),
            vec!["Address", "Amount of Balloons In", "Amount of ETH Out"]
        );
        assert_eq!(
            headers(EventName::LiquidityProvided),
            vec![
                "Address",
                "Amount of ETH In",
                "Amount of Balloons In",
                "Liquidity Minted"
            ]
        );
        assert_eq!(
            headers(EventName::LiquidityRemoved),
            vec![
                "Address",
                "Amount of ETH Out",
                "Amount of Balloons Out",
                "Liquidity Withdrawn"
            ]
        );
    }

    #[test]
    fn test_row_cells_approval() {
        let record = approval(Some(U256::from(1_234_500_000_000_000_000u64)));
        let cells = row_cells(EventName::Approval, &record);
        assert_eq!(
            cells,
            vec![
                "0x111111...1111".to_string(),
                "0x222222...2222".to_string(),
                "1.2345".to_string()
            ]
        );
    }

    #[test]
    fn test_row_cells_missing_values() {
        let record = approval(None);
        let cells = row_cells(EventName::Approval, &record);
        assert_eq!(cells[2], "0.0000");

        let swap = EventRecord {
            event: EventName::EthToTokenSwap,
            args: BTreeMap::new(),
            block_number: None,
            transaction_hash: None,
            log_index: None,
        };
        assert_eq!(
            row_cells(EventName::EthToTokenSwap, &swap),
            vec!["-".to_string(), "0.0000".to_string(), "0.0000".to_string()]
        );
    }

    #[test]
    fn test_detail_line_plain_and_linked() {
        let record = approval(Some(U256::ZERO));
        let plain = detail_line(EventName::Approval, &record, None);
        assert!(plain.contains(&Address::repeat_byte(0x11).to_string()));
        assert!(plain.contains("block #1,234"));

        let linked = detail_line(EventName::Approval, &record, Some("http://localhost:3000/blockexplorer"));
        assert!(linked.contains("http://localhost:3000/blockexplorer/address/0x1111"));
        assert!(linked.contains("/tx/0xabab"));
    }

    #[test]
    fn test_refetch_key() {
        let mut table = EventTable::new(EventName::LiquidityRemoved, None);
        let key = KeyEvent::from(KeyCode::Char('r'));
        assert!(matches!(
            table.handle_key(key),
            Some(AppEvent::Refetch(EventName::LiquidityRemoved))
        ));
    }

    #[test]
    fn test_selection_without_records_is_noop() {
        let mut table = EventTable::new(EventName::Approval, None);
        table.handle_key(KeyEvent::from(KeyCode::Char('j')));
        assert_eq!(table.table_state.selected(), None);
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

/// Amount input plus submit button for the token approval.
///
/// The amount text itself lives in the coordinator's approval request; the
/// form only tracks the cursor.
pub struct ApprovalForm {
    pub focused: bool,
    cursor_position: usize,
}

impl ApprovalForm {
    pub fn new() -> Self {
        Self {
            focused: true,
            cursor_position: 0,
        }
    }

    /// Edit `amount` for one key press. Returns true when the user asked to submit.
    pub fn handle_key(&mut self, key: KeyEvent, amount: &mut String) -> bool {
        self.cursor_position = self.cursor_position.min(amount.len());

        match key.code {
            KeyCode::Enter => return true,
            KeyCode::Backspace => {
                if self.cursor_position > 0 {
                    self.cursor_position -= 1;
                    amount.remove(self.cursor_position);
                }
            }
            KeyCode::Delete => {
                if self.cursor_position < amount.len() {
                    amount.remove(self.cursor_position);
                }
            }
            KeyCode::Left => {
                self.cursor_position = self.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor_position < amount.len() {
                    self.cursor_position += 1;
                }
            }
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => self.cursor_position = amount.len(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                amount.clear();
                self.cursor_position = 0;
            }
            // Only ASCII goes in so byte and char positions agree.
            KeyCode::Char(c) if c.is_ascii() && !c.is_ascii_control() => {
                amount.insert(self.cursor_position, c);
                self.cursor_position += 1;
            }
            _ => {}
        }
        false
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, amount: &str, submit_enabled: bool) {
        self.cursor_position = self.cursor_position.min(amount.len());

        let block = Block::default()
            .title(" Approve DEX to use your Balloons ")
            .borders(Borders::ALL)
            .border_style(THEME.panel_border(self.focused))
            .style(Style::default().bg(THEME.surface));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(22)])
            .split(inner);

        let text = if amount.is_empty() {
            Span::styled("Amount to approve", THEME.muted_style())
        } else {
            Span::styled(amount, Style::default().fg(THEME.text))
        };
        frame.render_widget(Paragraph::new(text), chunks[0]);

        let label = if submit_enabled {
            " Approve Balloons "
        } else {
            " Submitting... "
        };
        let button = Paragraph::new(label)
            .alignment(Alignment::Center)
            .style(THEME.button_style(submit_enabled));
        frame.render_widget(button, chunks[1]);

        if self.focused {
            let cursor_x = chunks[0].x + self.cursor_position as u16;
            if cursor_x < chunks[0].right() {
                frame.set_cursor_position((cursor_x, chunks[0].y));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(form: &mut ApprovalForm, amount: &mut String, code: KeyCode) -> bool {
        form.handle_key(KeyEvent::from(code), amount)
    }

    fn type_str(form: &mut ApprovalForm, amount: &mut String, s: &str) {
        for c in s.chars() {
            press(form, amount, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_and_enter() {
        let mut form = ApprovalForm::new();
        let mut amount = String::new();
        type_str(&mut form, &mut amount, "12.5");
        assert_eq!(amount, "12.5");
        assert!(press(&mut form, &mut amount, KeyCode::Enter));
        assert_eq!(amount, "12.5");
    }

    #[test]
    fn test_editing_in_the_middle() {
        let mut form = ApprovalForm::new();
        let mut amount = String::new();
        type_str(&mut form, &mut amount, "15");
        press(&mut form, &mut amount, KeyCode::Left);
        type_str(&mut form, &mut amount, ".");
        assert_eq!(amount, "1.5");
        press(&mut form, &mut amount, KeyCode::Backspace);
        assert_eq!(amount, "15");
        press(&mut form, &mut amount, KeyCode::Home);
        press(&mut form, &mut amount, KeyCode::Delete);
        assert_eq!(amount, "5");
    }

    #[test]
    fn test_cursor_clamped_after_external_clear() {
        let mut form = ApprovalForm::new();
        let mut amount = String::new();
        type_str(&mut form, &mut amount, "100");
        amount.clear();
        type_str(&mut form, &mut amount, "7");
        assert_eq!(amount, "7");
    }

    #[test]
    fn test_ctrl_u_clears() {
        let mut form = ApprovalForm::new();
        let mut amount = String::from("42");
        form.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL), &mut amount);
        assert!(amount.is_empty());
    }
}

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::Paragraph,
};

use crate::{
    action::Action,
    components::Component,
    tui::{EventResponse, Frame},
};

use super::{centered_rect_fixed, draw_popup_frame};

/// Read-only view of everything the session has stored so far.
pub struct DumpPopup {
    lines: Vec<String>,
    scroll: u16,
    page: u16,
}

impl DumpPopup {
    pub fn new(dump: String) -> Self {
        Self {
            lines: dump.lines().map(str::to_string).collect(),
            scroll: 0,
            page: 10,
        }
    }

    fn max_scroll(&self) -> u16 {
        (self.lines.len() as u16).saturating_sub(self.page)
    }

    fn scroll_by(&mut self, delta: i32) {
        let next = (i32::from(self.scroll) + delta).clamp(0, i32::from(self.max_scroll()));
        self.scroll = next as u16;
    }
}

impl Component for DumpPopup {
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        let page = i32::from(self.page.max(1));
        let action = match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('d') | KeyCode::Char('q') => {
                Action::ClosePopup
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_by(-1);
                Action::Update
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_by(1);
                Action::Update
            }
            KeyCode::PageUp => {
                self.scroll_by(-page);
                Action::Update
            }
            KeyCode::PageDown => {
                self.scroll_by(page);
                Action::Update
            }
            _ => Action::Update,
        };
        Ok(Some(EventResponse::Stop(action)))
    }

    fn popup_min_size(&self) -> Option<(u16, u16)> {
        Some((90, 30))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        if area.width < 5 || area.height < 5 {
            return Ok(());
        }
        let dialog = centered_rect_fixed(area, 90, 30);
        let inner = draw_popup_frame(f, dialog, "Form data");
        self.page = inner.height.saturating_sub(1);
        self.scroll = self.scroll.min(self.max_scroll());

        let mut lines: Vec<Line> = self
            .lines
            .iter()
            .skip(self.scroll as usize)
            .take(self.page as usize)
            .map(|l| Line::from(Span::styled(l.as_str(), Style::default().fg(Color::Cyan))))
            .collect();
        lines.push(
            Line::from(format!(
                "Up/Down: Scroll   Esc: Close   {}/{}",
                (self.scroll as usize + self.page as usize).min(self.lines.len()),
                self.lines.len()
            ))
            .fg(Color::DarkGray),
        );
        f.render_widget(Paragraph::new(Text::from(lines)), inner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn scrolling_is_bounded() {
        let dump = (0..25).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let mut popup = DumpPopup::new(dump);

        popup.handle_key_events(key(KeyCode::Up)).unwrap();
        assert_eq!(popup.scroll, 0);
        for _ in 0..40 {
            popup.handle_key_events(key(KeyCode::Down)).unwrap();
        }
        assert_eq!(popup.scroll, 15);
    }

    #[test]
    fn escape_closes() {
        let mut popup = DumpPopup::new("{}".into());
        assert_eq!(
            popup.handle_key_events(key(KeyCode::Esc)).unwrap(),
            Some(EventResponse::Stop(Action::ClosePopup))
        );
    }
}

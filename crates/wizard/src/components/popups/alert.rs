use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::{
    action::Action,
    components::Component,
    tui::{EventResponse, Frame},
};

use super::{centered_rect_fixed, draw_popup_frame};

/// Modal message box. Enter or Esc closes it.
pub struct AlertPopup {
    title: String,
    message: String,
    min_width: u16,
    min_height: u16,
}

impl AlertPopup {
    pub fn new<T: Into<String>, M: Into<String>>(title: T, message: M) -> Self {
        let message = message.into();
        // one row per message line plus frame, spacer and hint
        let rows = message.lines().count() as u16 + 4;
        Self {
            title: title.into(),
            message,
            min_width: 60,
            min_height: rows.max(7),
        }
    }

    pub fn min_width(mut self, w: u16) -> Self {
        self.min_width = w.max(20);
        self
    }
}

impl Component for AlertPopup {
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        let action = match key.code {
            KeyCode::Enter | KeyCode::Esc => Action::ClosePopup,
            // modal: swallow everything else
            _ => Action::Update,
        };
        Ok(Some(EventResponse::Stop(action)))
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Submit => Ok(Some(Action::ClosePopup)),
            _ => Ok(None),
        }
    }

    fn popup_min_size(&self) -> Option<(u16, u16)> {
        Some((self.min_width, self.min_height))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        if area.width < 5 || area.height < 5 {
            return Ok(());
        }

        let w = self.min_width.min(area.width);
        let h = self.min_height.min(area.height);
        let dialog = centered_rect_fixed(area, w, h);
        let inner = draw_popup_frame(f, dialog, &self.title);

        let mut lines: Vec<Line> = self
            .message
            .lines()
            .map(|l| Line::from(Span::raw(l)))
            .collect();
        if inner.height >= 3 {
            lines.push(Line::raw(""));
        }
        lines.push(
            Line::from(vec![
                Span::styled("Enter", Style::default().fg(Color::White)),
                Span::raw(": OK   "),
                Span::styled("Esc", Style::default().fg(Color::White)),
                Span::raw(": Close"),
            ])
            .fg(Color::DarkGray),
        );

        f.render_widget(
            Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true }),
            inner,
        );
        Ok(())
    }
}

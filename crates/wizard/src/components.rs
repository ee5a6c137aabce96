use color_eyre::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;

use crate::{
    action::Action,
    tui::{Event, EventResponse, Frame},
};

pub mod popup;
pub mod popups;

/// A visual, interactive element drawn by the app loop.
///
/// Popups implement this; the app routes every event and action to the open
/// popup before the active page sees it.
pub trait Component {
    fn handle_events(&mut self, event: Event) -> Result<Option<EventResponse<Action>>> {
        let r = match event {
            Event::Key(key_event) => self.handle_key_events(key_event)?,
            Event::Mouse(mouse_event) => self.handle_mouse_events(mouse_event)?,
            Event::Paste(text) => self.handle_paste(text)?,
            _ => None,
        };
        Ok(r)
    }

    fn handle_key_events(&mut self, _key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        Ok(None)
    }

    fn handle_mouse_events(
        &mut self,
        _mouse: MouseEvent,
    ) -> Result<Option<EventResponse<Action>>> {
        Ok(None)
    }

    fn handle_paste(&mut self, _text: String) -> Result<Option<EventResponse<Action>>> {
        Ok(None)
    }

    fn update(&mut self, _action: Action) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Preferred dialog size for popups.
    fn popup_min_size(&self) -> Option<(u16, u16)> {
        None
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()>;
}

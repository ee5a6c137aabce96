use color_eyre::Result;
use crossterm::event::KeyEvent;
use pdd_core::Session;
use ratatui::layout::Rect;

use crate::{
    action::Action,
    tui::{EventResponse, Frame},
};

mod estimate;
mod export;
mod intro;
mod project;
mod sections;

pub use estimate::EstimatePage;
pub use export::ExportPage;
pub use intro::IntroPage;
pub use project::ProjectPage;
pub use sections::SectionsPage;

/// One wizard step.
///
/// Pages hold only view state; everything the user enters lives in the
/// [`Session`], which the app lends them per call.
pub trait Page {
    /// Tab title.
    fn title(&self) -> &str;

    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        session: &Session,
    ) -> Result<Option<EventResponse<Action>>> {
        let _ = (key, session);
        Ok(None)
    }

    fn update(&mut self, action: Action, session: &mut Session) -> Result<Option<Action>> {
        let _ = (action, session);
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, session: &Session) -> Result<()>;
}

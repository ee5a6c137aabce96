use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use pdd_core::{Section, Session};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::{
    action::Action,
    tui::{EventResponse, Frame},
};

use super::Page;

/// Summary of the project-details step. The form itself is a popup.
pub struct ProjectPage;

impl Page for ProjectPage {
    fn title(&self) -> &str {
        "Project"
    }

    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        _session: &Session,
    ) -> Result<Option<EventResponse<Action>>> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('e') => Ok(Some(EventResponse::Stop(
                Action::OpenForm(Section::Project),
            ))),
            _ => Ok(None),
        }
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, session: &Session) -> Result<()> {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Project details ");

        let Ok(inputs) = session.project_inputs() else {
            let para = Paragraph::new(vec![
                Line::raw("No project details entered yet."),
                Line::raw(""),
                Line::styled(
                    "Press Enter to fill in land area, tree density, species and duration.",
                    Style::default().fg(Color::DarkGray),
                ),
            ])
            .block(block);
            frame.render_widget(para, area);
            return Ok(());
        };

        let or_dash = |s: &str| {
            if s.is_empty() {
                "-".to_string()
            } else {
                s.to_string()
            }
        };
        let rows = [
            ("Developer", or_dash(&inputs.developer_name)),
            ("Location", or_dash(&inputs.location)),
            ("Land area", format!("{} ha", inputs.land_area_hectares)),
            (
                "Tree density",
                format!("{} trees/ha", inputs.tree_density_per_hectare),
            ),
            ("Species", inputs.species.to_string()),
            ("Start year", inputs.start_year.to_string()),
            ("Duration", format!("{} years", inputs.duration_years)),
        ]
        .into_iter()
        .map(|(label, value)| {
            Row::new([
                Cell::from(label).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(value).style(Style::default().fg(Color::Cyan)),
            ])
        });

        let table = Table::new(rows, [Constraint::Length(16), Constraint::Min(10)])
            .block(block.title_bottom(" Enter: edit "));
        frame.render_widget(table, area);
        Ok(())
    }
}

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use pdd_core::{EstimationResult, Section, Session, SessionError, format_tons};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use tracing::debug;

use crate::{
    action::Action,
    tui::{EventResponse, Frame},
};

use super::Page;

pub const PREREQUISITE_WARNING: &str = "Please complete the project details step first.";

/// Carbon-credit estimate of the committed project inputs.
#[derive(Default)]
pub struct EstimatePage {
    result: Option<Estimate>,
    warning: Option<String>,
}

struct Estimate {
    total_trees: f64,
    result: EstimationResult,
}

impl EstimatePage {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(&mut self, session: &mut Session) {
        match session.estimate() {
            Ok(result) => {
                let total_trees = session
                    .project_inputs()
                    .map(|i| i.land_area_hectares * f64::from(i.tree_density_per_hectare))
                    .unwrap_or_default();
                self.result = Some(Estimate {
                    total_trees,
                    result,
                });
                self.warning = None;
            }
            Err(SessionError::PrerequisiteMissing { missing, .. }) => {
                debug!(?missing, "estimate without project details");
                self.result = None;
                self.warning = Some(PREREQUISITE_WARNING.to_string());
            }
            Err(err) => {
                self.result = None;
                self.warning = Some(err.to_string());
            }
        }
    }

    fn result_rows(estimate: &Estimate, buffer_percent: f64) -> Vec<(String, String)> {
        let r = &estimate.result;
        vec![
            ("Total trees".into(), format_tons(estimate.total_trees)),
            (
                "Total biomass (t)".into(),
                format_tons(r.total_biomass_tons),
            ),
            (
                "Carbon content (t)".into(),
                format_tons(r.carbon_content_tons),
            ),
            ("CO2e (t)".into(), format_tons(r.co2e_tons)),
            (
                format!("Buffer deduction ({buffer_percent}%)"),
                format_tons(r.buffer_deduction_tons),
            ),
            (
                "Usable carbon credits (t)".into(),
                format_tons(r.usable_credits_tons),
            ),
        ]
    }
}

impl Page for EstimatePage {
    fn title(&self) -> &str {
        "Estimate"
    }

    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        _session: &Session,
    ) -> Result<Option<EventResponse<Action>>> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('e') => {
                Ok(Some(EventResponse::Stop(Action::Estimate)))
            }
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: Action, session: &mut Session) -> Result<Option<Action>> {
        match action {
            Action::Estimate => self.run(session),
            // keep a shown estimate in step with edited inputs
            Action::SectionSaved(Section::Project) if self.result.is_some() => self.run(session),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, session: &Session) -> Result<()> {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)])
            .split(area);

        let methodology = session.methodology();
        let intro = Paragraph::new(vec![
            Line::raw(format!(
                "Biomass per tree over the project duration, {} carbon fraction, \
                 CO2e factor {}, {}% risk buffer.",
                methodology.carbon_fraction,
                methodology.co2e_factor,
                methodology.buffer_percent()
            )),
            Line::styled(
                "Enter: calculate estimated carbon credits",
                Style::default().fg(Color::DarkGray),
            ),
        ])
        .block(Block::default().borders(Borders::ALL).title(" Estimate "));
        frame.render_widget(intro, chunks[0]);

        if let Some(warning) = &self.warning {
            let para = Paragraph::new(Line::styled(
                warning.as_str(),
                Style::default().fg(Color::Yellow),
            ))
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(para, chunks[1]);
            return Ok(());
        }

        let Some(estimate) = &self.result else {
            return Ok(());
        };
        let rows = Self::result_rows(estimate, methodology.buffer_percent())
            .into_iter()
            .map(|(label, value)| {
                Row::new([
                    Cell::from(label),
                    Cell::from(Line::from(value).right_aligned())
                        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                ])
            });
        let table = Table::new(rows, [Constraint::Length(28), Constraint::Length(14)])
            .block(Block::default().borders(Borders::ALL).title(" Result "));
        frame.render_widget(table, chunks[1]);
        Ok(())
    }
}

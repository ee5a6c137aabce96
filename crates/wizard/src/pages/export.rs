use std::path::PathBuf;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use pdd_core::{DOCX_MIME_TYPE, Session, catalog::find_field};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::{
    action::Action,
    tui::{EventResponse, Frame},
};

use super::Page;

/// Last step: fill the template and save the PDD.
pub struct ExportPage {
    template: Option<PathBuf>,
    output: PathBuf,
}

impl ExportPage {
    pub fn new(template: Option<PathBuf>, output: PathBuf) -> Self {
        Self { template, output }
    }
}

impl Page for ExportPage {
    fn title(&self) -> &str {
        "Export"
    }

    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        _session: &Session,
    ) -> Result<Option<EventResponse<Action>>> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('s') => Ok(Some(EventResponse::Stop(Action::Export))),
            _ => Ok(None),
        }
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, session: &Session) -> Result<()> {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let template = self
            .template
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in template".to_string());

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Session state: ", bold),
                Span::raw(session.state().to_string()),
            ]),
            Line::from(vec![Span::styled("Template:      ", bold), Span::raw(template)]),
            Line::from(vec![
                Span::styled("Output:        ", bold),
                Span::raw(self.output.display().to_string()),
            ]),
            Line::from(vec![
                Span::styled("Format:        ", bold),
                Span::styled(DOCX_MIME_TYPE, Style::default().fg(Color::DarkGray)),
            ]),
            Line::raw(""),
        ];

        let missing = session.missing_required();
        if missing.is_empty() {
            lines.push(Line::styled(
                "All required fields are filled in.",
                Style::default().fg(Color::Green),
            ));
        } else {
            lines.push(Line::styled(
                format!(
                    "{} required field(s) still empty; their placeholders stay blank:",
                    missing.len()
                ),
                Style::default().fg(Color::Yellow),
            ));
            for key in missing {
                lines.push(Line::raw(format!(
                    "  • {} ({key})",
                    find_field(key).map(|f| f.label).unwrap_or(key)
                )));
            }
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Enter: generate and save the PDD",
            Style::default().fg(Color::DarkGray),
        ));

        let para = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Download PDD "))
            .wrap(Wrap { trim: false });
        frame.render_widget(para, area);
        Ok(())
    }
}

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use pdd_core::{Section, Session};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::{
    action::Action,
    tui::{EventResponse, Frame},
};

use super::Page;

/// The narrative PDD chapters, each edited in its own form.
pub struct SectionsPage {
    sections: Vec<Section>,
    list_state: ListState,
}

impl SectionsPage {
    pub fn new() -> Self {
        Self {
            sections: Section::pdd_sections().collect(),
            list_state: ListState::default().with_selected(Some(0)),
        }
    }

    fn selected(&self) -> Option<Section> {
        self.list_state
            .selected()
            .and_then(|i| self.sections.get(i).copied())
    }

    fn select_offset(&mut self, delta: isize) {
        let len = self.sections.len() as isize;
        if len == 0 {
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as isize;
        self.list_state
            .select(Some((cur + delta).rem_euclid(len) as usize));
    }
}

impl Page for SectionsPage {
    fn title(&self) -> &str {
        "Sections"
    }

    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        _session: &Session,
    ) -> Result<Option<EventResponse<Action>>> {
        let response = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_offset(-1);
                EventResponse::Stop(Action::Update)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_offset(1);
                EventResponse::Stop(Action::Update)
            }
            KeyCode::Enter => match self.selected() {
                Some(section) => EventResponse::Stop(Action::OpenForm(section)),
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        Ok(Some(response))
    }

    fn update(&mut self, action: Action, _session: &mut Session) -> Result<Option<Action>> {
        // move on to the next chapter once one is saved
        if let Action::SectionSaved(saved) = action {
            if self.selected() == Some(saved) {
                if let Some(i) = self.sections.iter().position(|s| *s == saved) {
                    if i + 1 < self.sections.len() {
                        self.list_state.select(Some(i + 1));
                    }
                }
            }
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, session: &Session) -> Result<()> {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(40), Constraint::Min(20)])
            .split(area);

        let items: Vec<ListItem> = self
            .sections
            .iter()
            .map(|s| {
                let (done, total) = session.section_progress(*s);
                let missing = s.missing_required(session.store()).len();
                let marker = if missing == 0 {
                    Span::styled("✔ ", Style::default().fg(Color::Green))
                } else {
                    Span::styled("• ", Style::default().fg(Color::Yellow))
                };
                ListItem::new(Line::from(vec![
                    marker,
                    Span::raw(format!("{:<24}", s.to_string())),
                    Span::styled(
                        format!("{done}/{total}"),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" PDD sections "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

        let mut lines = Vec::new();
        if let Some(section) = self.selected() {
            for field in section.fields() {
                let value = session
                    .store()
                    .get(field.key)
                    .map(|v| v.display_value())
                    .unwrap_or_else(|| "-".to_string());
                let label_style = if field.required {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(field.label, label_style)));
                lines.push(Line::from(Span::styled(
                    format!("  {value}"),
                    Style::default().fg(Color::Cyan),
                )));
            }
        }
        let detail = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Entered ")
                    .title_bottom(" Enter: edit  Up/Down: select "),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(detail, chunks[1]);
        Ok(())
    }
}

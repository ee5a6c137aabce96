use std::path::PathBuf;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pdd_core::{DocumentRenderer, Section, Session, template::write_default_template};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs},
};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::{
    action::{Action, FormValues},
    components::{
        Component,
        popups::{alert::AlertPopup, dump::DumpPopup, render_backdrop},
    },
    config::{self, Config},
    forms,
    pages::{EstimatePage, ExportPage, IntroPage, Page, ProjectPage, SectionsPage},
    tui::{Event, EventResponse, Frame, Tui},
};

/// Built-in template is written here when no template is configured.
const BUILTIN_TEMPLATE: &str = "default_template.docx";

pub struct App {
    pub config: Config,
    pub session: Session,
    pub renderer: DocumentRenderer,
    pub template: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub pages: Vec<Box<dyn Page>>,
    pub active_page: usize,
    pub popup: Option<Box<dyn Component>>,
    pub should_quit: bool,
    pub should_suspend: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let session = Session::with_methodology(config.methodology.clone());
        let renderer = DocumentRenderer::new().require(config.export.required_placeholders.clone());
        let template = config.export.template_path.clone();
        let output_dir = config.output_dir();
        let output = output_dir.join(&config.export.file_name);

        info!(session = %session.id(), "wizard session started");
        Self {
            pages: vec![
                Box::new(IntroPage),
                Box::new(ProjectPage),
                Box::new(EstimatePage::new()),
                Box::new(SectionsPage::new()),
                Box::new(ExportPage::new(template.clone(), output)),
            ],
            config,
            session,
            renderer,
            template,
            output_dir,
            active_page: 0,
            popup: None,
            should_quit: false,
            should_suspend: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

        let mut tui = Tui::new()?.paste(true);
        tui.enter()?;

        loop {
            if let Some(e) = tui.next().await {
                self.handle_event(e, &action_tx)?;
            }

            while let Ok(action) = action_rx.try_recv() {
                if !matches!(action, Action::Tick | Action::Render) {
                    debug!("{action:?}");
                }
                match action {
                    Action::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, w, h))?;
                        self.draw_to(&mut tui, &action_tx)?;
                    }
                    Action::Render => self.draw_to(&mut tui, &action_tx)?,
                    action => {
                        for follow_up in self.dispatch(action)? {
                            action_tx.send(follow_up)?;
                        }
                    }
                }
            }

            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume)?;
                tui = Tui::new()?.paste(true);
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        info!(session = %self.session.id(), state = %self.session.state(), "wizard session ended");
        Ok(())
    }

    fn handle_event(&mut self, e: Event, action_tx: &UnboundedSender<Action>) -> Result<()> {
        match e {
            Event::Quit => return Ok(action_tx.send(Action::Quit)?),
            Event::Tick => return Ok(action_tx.send(Action::Tick)?),
            Event::Render => return Ok(action_tx.send(Action::Render)?),
            Event::Resize(x, y) => return Ok(action_tx.send(Action::Resize(x, y))?),
            Event::Error => return Ok(action_tx.send(Action::Error("terminal event error".into()))?),
            _ => {}
        }

        if let Event::Key(key) = &e {
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Ok(action_tx.send(Action::Quit)?);
            }
        }

        // an open popup is modal
        if let Some(popup) = self.popup.as_mut() {
            if let Some(EventResponse::Continue(action) | EventResponse::Stop(action)) =
                popup.handle_events(e)?
            {
                action_tx.send(action)?;
            }
            return Ok(());
        }

        let Event::Key(key) = e else {
            return Ok(());
        };

        let stop_event_propagation = match self.pages.get_mut(self.active_page) {
            Some(page) => match page.handle_key_events(key, &self.session)? {
                Some(EventResponse::Continue(action)) => {
                    action_tx.send(action)?;
                    false
                }
                Some(EventResponse::Stop(action)) => {
                    action_tx.send(action)?;
                    true
                }
                None => false,
            },
            None => false,
        };

        if !stop_event_propagation {
            if let Some(action) = global_key_action(key) {
                action_tx.send(action)?;
            }
        }
        Ok(())
    }

    /// Apply one action and collect the actions it triggers.
    pub fn dispatch(&mut self, action: Action) -> Result<Vec<Action>> {
        let mut follow_ups = Vec::new();
        match &action {
            Action::Quit => self.should_quit = true,
            Action::Suspend => self.should_suspend = true,
            Action::Resume => self.should_suspend = false,
            Action::Error(message) => {
                error!("{message}");
                follow_ups.push(Action::Alert {
                    title: "Error".into(),
                    message: message.clone(),
                });
            }
            Action::Navigate(index) if *index < self.pages.len() => self.active_page = *index,
            Action::NextPage => self.active_page = (self.active_page + 1) % self.pages.len(),
            Action::PrevPage => {
                self.active_page = (self.active_page + self.pages.len() - 1) % self.pages.len()
            }
            Action::OpenForm(section) => {
                self.popup = Some(Box::new(forms::form_popup(*section, self.session.store())));
            }
            Action::FormSubmitted { section, values } => {
                follow_ups.push(self.submit_form(*section, values));
            }
            Action::Export => follow_ups.push(self.export()),
            Action::ToggleDump => {
                self.popup = Some(Box::new(DumpPopup::new(self.session.store().dump())));
            }
            Action::Alert { title, message } => {
                let width = message.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                self.popup = Some(Box::new(
                    AlertPopup::new(title.clone(), message.clone())
                        .min_width((width as u16).saturating_add(6).max(60)),
                ));
            }
            Action::ClosePopup => self.popup = None,
            _ => {}
        }

        if let Some(popup) = self.popup.as_mut() {
            if let Some(next) = popup.update(action.clone())? {
                follow_ups.push(next);
            }
        }
        for page in self.pages.iter_mut() {
            if let Some(next) = page.update(action.clone(), &mut self.session)? {
                follow_ups.push(next);
            }
        }
        Ok(follow_ups)
    }

    fn submit_form(&mut self, section: Section, values: &FormValues) -> Action {
        let raw = values.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        match self
            .session
            .submit_section(section, raw, self.config.export.max_upload_bytes)
        {
            Ok(_) => {
                self.popup = None;
                Action::SectionSaved(section)
            }
            Err(err) => {
                warn!(section = section.key(), error = %err, "form rejected");
                Action::FormRejected(err.to_string())
            }
        }
    }

    fn export(&mut self) -> Action {
        match self.export_document() {
            Ok(path) => Action::Alert {
                title: "PDD saved".into(),
                message: format!("Saved to {}", path.display()),
            },
            Err(err) => {
                error!(error = %err, "export failed");
                Action::Alert {
                    title: "Download failed".into(),
                    message: format!("Download failed: {err}"),
                }
            }
        }
    }

    /// Render the PDD and save it in the output directory.
    ///
    /// Nothing appears at the output path unless the whole document was
    /// written.
    pub fn export_document(&mut self) -> Result<PathBuf> {
        let template = match &self.template {
            Some(path) => path.clone(),
            None => {
                let dir = if self.config.config.data_dir.as_os_str().is_empty() {
                    config::get_data_dir()
                } else {
                    self.config.config.data_dir.clone()
                };
                let path = dir.join(BUILTIN_TEMPLATE);
                write_default_template(&path)?;
                path
            }
        };

        let dest = self.output_dir.join(&self.config.export.file_name);
        Ok(self
            .session
            .save_document(&self.renderer, &template, &dest)?)
    }

    fn draw_to(&mut self, tui: &mut Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
        tui.draw(|f| {
            if let Err(err) = self.draw(f) {
                let _ = action_tx.send(Action::Error(format!("Failed to draw: {err:?}")));
            }
        })?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let titles: Vec<String> = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{} {}", i + 1, p.title()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.active_page)
            .block(Block::default().borders(Borders::ALL).title(" Agroforestry PDD "))
            .highlight_style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, header);

        if let Some(page) = self.pages.get_mut(self.active_page) {
            page.draw(frame, body, &self.session)?;
        }

        let status = Line::from(vec![
            Span::styled(
                format!(" {} ", self.session.state()),
                Style::default().fg(Color::Black).bg(Color::Green),
            ),
            Span::styled(
                "  1-5/[ ]: step  d: data  Ctrl+Z: suspend  q: quit",
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(status, footer);

        if let Some(popup) = self.popup.as_mut() {
            let area = frame.area();
            render_backdrop(frame, area);
            popup.draw(frame, area)?;
        }
        Ok(())
    }
}

fn global_key_action(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('z') => Some(Action::Suspend),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('d') => Some(Action::ToggleDump),
        KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|d| Action::Navigate(d as usize - 1)),
        KeyCode::Char(']') | KeyCode::Tab => Some(Action::NextPage),
        KeyCode::Char('[') | KeyCode::BackTab => Some(Action::PrevPage),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pdd_core::{FormValue, SessionState, inputs::keys};
    use pretty_assertions::assert_eq;

    use super::*;

    fn app_in(dir: &std::path::Path) -> App {
        let mut config = Config::default();
        config.config.data_dir = dir.join("data");
        config.export.output_dir = Some(dir.join("out"));
        config.export.file_name = "pdd.docx".into();
        App::new(config)
    }

    fn project_values(area: &str) -> FormValues {
        [
            (keys::LAND_AREA, area),
            (keys::TREE_DENSITY, "400"),
            (keys::START_YEAR, "2025"),
            (keys::DURATION, "20"),
            (keys::SPECIES, "Neem"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn global_keys() {
        let key = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        assert_eq!(global_key_action(key('3')), Some(Action::Navigate(2)));
        assert_eq!(global_key_action(key('q')), Some(Action::Quit));
        assert_eq!(global_key_action(key('x')), None);
        assert_eq!(
            global_key_action(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL)),
            Some(Action::Suspend)
        );
    }

    #[test]
    fn saved_form_closes_popup() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());

        app.dispatch(Action::OpenForm(Section::Project)).unwrap();
        assert!(app.popup.is_some());

        let follow_ups = app
            .dispatch(Action::FormSubmitted {
                section: Section::Project,
                values: project_values("10"),
            })
            .unwrap();
        assert_eq!(follow_ups, vec![Action::SectionSaved(Section::Project)]);
        assert!(app.popup.is_none());
        assert_eq!(
            app.session.store().get(keys::LAND_AREA),
            Some(&FormValue::Float(10.0))
        );
    }

    #[test]
    fn rejected_form_stays_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        app.dispatch(Action::OpenForm(Section::Project)).unwrap();

        let follow_ups = app
            .dispatch(Action::FormSubmitted {
                section: Section::Project,
                values: project_values("-1"),
            })
            .unwrap();
        assert!(matches!(follow_ups.as_slice(), [Action::FormRejected(_)]));
        assert!(app.popup.is_some());
        assert!(app.session.store().is_empty());
    }

    #[test]
    fn export_writes_document_with_builtin_template() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        app.dispatch(Action::FormSubmitted {
            section: Section::Project,
            values: project_values("10"),
        })
        .unwrap();

        let path = app.export_document().unwrap();
        assert_eq!(path, dir.path().join("out").join("pdd.docx"));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        assert_eq!(app.session.state(), SessionState::Rendered);
    }

    #[test]
    fn failed_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        app.template = Some(dir.path().join("missing.docx"));

        let follow_ups = app.dispatch(Action::Export).unwrap();
        match follow_ups.as_slice() {
            [Action::Alert { message, .. }] => assert!(message.starts_with("Download failed")),
            other => panic!("unexpected follow-ups: {other:?}"),
        }
        assert!(!dir.path().join("out").join("pdd.docx").exists());
        assert_ne!(app.session.state(), SessionState::Rendered);
    }

    #[test]
    fn unwritable_output_is_not_reported_as_rendered() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        app.dispatch(Action::FormSubmitted {
            section: Section::Project,
            values: project_values("10"),
        })
        .unwrap();
        std::fs::write(dir.path().join("out"), b"a file, not a directory").unwrap();

        let follow_ups = app.dispatch(Action::Export).unwrap();
        match follow_ups.as_slice() {
            [Action::Alert { title, .. }] => assert_eq!(title, "Download failed"),
            other => panic!("unexpected follow-ups: {other:?}"),
        }
        assert_eq!(app.session.state(), SessionState::PartiallyFilled);
    }
}

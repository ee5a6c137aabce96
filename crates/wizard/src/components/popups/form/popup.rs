use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pdd_core::Section;
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    action::{Action, FormValues},
    components::Component,
    tui::{EventResponse, Frame},
};

use super::{FormField, FormFieldKind, FormSchema, FormState};

/// Interactive form for one wizard step. Drawing lives in `render.rs`.
///
/// Submitting emits [`Action::FormSubmitted`] with the raw text of every
/// field; the popup stays open until the app closes it, so a rejected
/// submit (`Action::FormRejected`) keeps the entries.
pub struct FormPopup {
    section: Section,
    schema: FormSchema,
    state: FormState,

    focused: usize,
    scroll: usize,
    editing: bool,
    input: Input,
    last_inner_height: u16,
}

impl FormPopup {
    pub fn new(section: Section, schema: FormSchema) -> Self {
        Self {
            section,
            schema,
            state: FormState::default(),
            focused: 0,
            scroll: 0,
            editing: false,
            input: Input::default(),
            last_inner_height: 0,
        }
    }

    pub fn with_state(mut self, state: FormState) -> Self {
        self.state = state;
        self
    }

    pub(super) fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub(super) fn state(&self) -> &FormState {
        &self.state
    }

    pub(super) fn field_count(&self) -> usize {
        self.schema.fields.len()
    }

    pub(super) fn focused_index(&self) -> usize {
        self.focused
    }

    pub(super) fn scroll(&self) -> usize {
        self.scroll
    }

    pub(super) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(super) fn input_value(&self) -> &str {
        self.input.value()
    }

    pub(super) fn set_last_inner_height(&mut self, h: u16) {
        self.last_inner_height = h;
    }

    /// Fields that fit in `inner_height`, three rows each.
    pub(super) fn visible_capacity(inner_height: u16) -> usize {
        let reserve = if inner_height > 8 { 4 } else { 2 };
        (inner_height.saturating_sub(reserve) / 3).max(1) as usize
    }

    pub(super) fn visible_bounds(&self, inner_height: u16) -> (usize, usize) {
        let total = self.field_count();
        if total == 0 {
            return (0, 0);
        }
        let start = self.scroll.min(self.focused).min(total.saturating_sub(1));
        let end = (start + Self::visible_capacity(inner_height)).min(total);
        (start, end)
    }

    pub(super) fn ensure_visible(&mut self, inner_height: u16) {
        let max_visible = Self::visible_capacity(inner_height);
        if self.focused < self.scroll {
            self.scroll = self.focused;
        } else if self.focused >= self.scroll + max_visible {
            self.scroll = self.focused + 1 - max_visible;
        }
    }

    fn current_field(&self) -> Option<&FormField> {
        self.schema.fields.get(self.focused)
    }

    fn focus_next(&mut self) {
        if self.field_count() == 0 {
            return;
        }
        self.focused = (self.focused + 1) % self.field_count();
    }

    fn focus_prev(&mut self) {
        if self.field_count() == 0 {
            return;
        }
        if self.focused == 0 {
            self.focused = self.field_count() - 1;
        } else {
            self.focused -= 1;
        }
    }

    fn cycle_select(&mut self, key: &str, options: &[String], dir: i32) {
        if options.is_empty() {
            return;
        }
        let cur = self
            .state
            .get_value(key)
            .unwrap_or_else(|| options[0].as_str());
        let idx = options.iter().position(|o| o == cur).unwrap_or(0) as i32;
        let len = options.len() as i32;
        let next = (idx + dir).rem_euclid(len) as usize;
        self.state.set_value(key, options[next].clone());
    }

    fn step_slider(&mut self, key: &str, min: i64, max: i64, step: i64, dir: i64) {
        let cur = self
            .state
            .get_value(key)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(min);
        let next = (cur + dir * step).clamp(min, max);
        self.state.set_value(key, next.to_string());
    }

    fn start_editing(&mut self) {
        let existing = match self.current_field() {
            Some(field) if field.is_textual() => self
                .state
                .get_value(&field.key)
                .unwrap_or_default()
                .to_string(),
            _ => return,
        };
        self.editing = true;
        self.input = Input::default().with_value(existing);
    }

    fn cancel_editing(&mut self) {
        self.editing = false;
        self.input = Input::default();
    }

    fn commit_editing(&mut self) {
        if let Some(key) = self.current_field().map(|f| f.key.clone()) {
            let value = self.input.value().to_string();
            self.state.set_value(&key, value);
        }
        self.editing = false;
        self.input = Input::default();
    }

    /// Current value as shown in the form.
    pub(super) fn field_display_value(&self, field: &FormField) -> String {
        let value = self.state.get_value(&field.key).unwrap_or_default();
        match &field.kind {
            FormFieldKind::Text | FormFieldKind::Path | FormFieldKind::Number => value.to_string(),
            FormFieldKind::Slider { min, max, step } => {
                let shown = if value.is_empty() {
                    min.to_string()
                } else {
                    value.to_string()
                };
                format!("◀ {shown} ▶  ({min}-{max}, step {step})")
            }
            FormFieldKind::Select { options } => {
                let v = if value.is_empty() {
                    options.first().map(|s| s.as_str()).unwrap_or_default()
                } else {
                    value
                };
                format!("◀ {v} ▶")
            }
        }
    }

    /// Raw text the session receives for `field`.
    fn submitted_value(&self, field: &FormField) -> String {
        match (&field.kind, self.state.get_value(&field.key)) {
            (_, Some(v)) if !v.is_empty() => v.to_string(),
            (FormFieldKind::Select { options }, _) => options.first().cloned().unwrap_or_default(),
            (FormFieldKind::Slider { min, .. }, _) => min.to_string(),
            _ => String::new(),
        }
    }

    fn validate(&mut self) -> bool {
        self.state.clear_validation();

        for f in &self.schema.fields {
            let value = self.submitted_value(f);
            if let Some(validator) = &f.validator {
                if let Err(msg) = validator(&value) {
                    self.state.errors.insert(f.key.clone(), msg);
                }
            }
        }

        self.state.errors.is_empty()
    }

    fn submit(&mut self) -> Action {
        if !self.validate() {
            return Action::Update;
        }
        let values: FormValues = self
            .schema
            .fields
            .iter()
            .map(|f| (f.key.clone(), self.submitted_value(f)))
            .collect();
        Action::FormSubmitted {
            section: self.section,
            values,
        }
    }
}

impl Component for FormPopup {
    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        if self.editing {
            match key.code {
                KeyCode::Enter => self.commit_editing(),
                KeyCode::Esc => self.cancel_editing(),
                _ => {
                    self.input.handle_event(&crossterm::event::Event::Key(key));
                }
            }
            return Ok(Some(EventResponse::Stop(Action::Update)));
        }

        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(Some(EventResponse::Stop(Action::Submit)));
        }

        let page = Self::visible_capacity(self.last_inner_height);
        let action = match key.code {
            KeyCode::Up | KeyCode::BackTab => {
                self.focus_prev();
                Action::Update
            }
            KeyCode::Down | KeyCode::Tab => {
                self.focus_next();
                Action::Update
            }
            KeyCode::PageDown => {
                for _ in 0..page {
                    self.focus_next();
                }
                Action::Update
            }
            KeyCode::PageUp => {
                for _ in 0..page {
                    self.focus_prev();
                }
                Action::Update
            }
            KeyCode::Home => {
                self.focused = 0;
                Action::Update
            }
            KeyCode::End => {
                self.focused = self.field_count().saturating_sub(1);
                Action::Update
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                let dir = if key.code == KeyCode::Left { -1 } else { 1 };
                let target = self.current_field().map(|f| (f.key.clone(), f.kind.clone()));
                match target {
                    Some((k, FormFieldKind::Select { options })) => {
                        self.cycle_select(&k, &options, dir)
                    }
                    Some((k, FormFieldKind::Slider { min, max, step })) => {
                        self.step_slider(&k, min, max, step, i64::from(dir))
                    }
                    _ => {}
                }
                Action::Update
            }
            KeyCode::Enter => {
                if self.current_field().is_some_and(|f| f.is_textual()) {
                    self.start_editing();
                    Action::Update
                } else {
                    Action::Submit
                }
            }
            KeyCode::Esc => Action::ClosePopup,
            // modal: nothing leaks to the page underneath
            _ => Action::Update,
        };
        Ok(Some(EventResponse::Stop(action)))
    }

    fn handle_paste(&mut self, text: String) -> Result<Option<EventResponse<Action>>> {
        let text = text.trim_end_matches(['\r', '\n']).to_string();
        if self.editing {
            let joined = format!("{}{}", self.input.value(), text);
            self.input = Input::default().with_value(joined);
        } else if let Some(key) = self
            .current_field()
            .filter(|f| f.is_textual())
            .map(|f| f.key.clone())
        {
            self.state.set_value(&key, text);
        }
        Ok(Some(EventResponse::Stop(Action::Update)))
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Submit => Ok(Some(self.submit())),
            Action::FormRejected(message) => {
                self.state.global_errors = vec![message];
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn popup_min_size(&self) -> Option<(u16, u16)> {
        Some((self.schema.min_width, self.schema.min_height))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: ratatui::layout::Rect) -> Result<()> {
        super::render::render_form_popup(self, f, area)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn popup() -> FormPopup {
        let schema = FormSchema::new(
            "Test",
            vec![
                FormField::new("t.name", "Name", FormFieldKind::Text)
                    .required(true)
                    .validator(|v| {
                        if v.trim().is_empty() {
                            Err("must not be empty".into())
                        } else {
                            Ok(())
                        }
                    }),
                FormField::new(
                    "t.density",
                    "Density",
                    FormFieldKind::Slider {
                        min: 100,
                        max: 1000,
                        step: 50,
                    },
                ),
                FormField::new(
                    "t.species",
                    "Species",
                    FormFieldKind::Select {
                        options: vec!["Neem".into(), "Bamboo".into()],
                    },
                ),
            ],
        );
        let mut state = FormState::default();
        state.set_value("t.density", "950");
        FormPopup::new(Section::Project, schema).with_state(state)
    }

    fn type_text(p: &mut FormPopup, text: &str) {
        for c in text.chars() {
            p.handle_key_events(key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn edit_then_submit_emits_raw_values() {
        let mut p = popup();
        p.handle_key_events(key(KeyCode::Enter)).unwrap();
        assert!(p.is_editing());
        type_text(&mut p, "Green Roots");
        p.handle_key_events(key(KeyCode::Enter)).unwrap();
        assert_eq!(p.state().get_value("t.name"), Some("Green Roots"));

        p.handle_key_events(key(KeyCode::Down)).unwrap();
        p.handle_key_events(key(KeyCode::Right)).unwrap();
        p.handle_key_events(key(KeyCode::Right)).unwrap();
        p.handle_key_events(key(KeyCode::Down)).unwrap();
        p.handle_key_events(key(KeyCode::Left)).unwrap();

        let action = p.update(Action::Submit).unwrap();
        assert_eq!(
            action,
            Some(Action::FormSubmitted {
                section: Section::Project,
                values: vec![
                    ("t.name".into(), "Green Roots".into()),
                    ("t.density".into(), "1000".into()),
                    ("t.species".into(), "Bamboo".into()),
                ],
            })
        );
    }

    #[test]
    fn invalid_field_blocks_submit() {
        let mut p = popup();
        assert_eq!(p.update(Action::Submit).unwrap(), Some(Action::Update));
        assert_eq!(
            p.state().errors.get("t.name").map(String::as_str),
            Some("must not be empty")
        );
    }

    #[test]
    fn escape_cancels_edit_before_closing() {
        let mut p = popup();
        p.handle_key_events(key(KeyCode::Enter)).unwrap();
        type_text(&mut p, "draft");
        assert_eq!(
            p.handle_key_events(key(KeyCode::Esc)).unwrap(),
            Some(EventResponse::Stop(Action::Update))
        );
        assert_eq!(p.state().get_value("t.name"), None);
        assert_eq!(
            p.handle_key_events(key(KeyCode::Esc)).unwrap(),
            Some(EventResponse::Stop(Action::ClosePopup))
        );
    }

    #[test]
    fn rejected_submit_is_shown_in_form() {
        let mut p = popup();
        p.update(Action::FormRejected("upload too large".into()))
            .unwrap();
        assert_eq!(p.state().global_errors, vec!["upload too large".to_string()]);
    }

    #[test]
    fn paste_fills_focused_text_field() {
        let mut p = popup();
        p.handle_paste("/tmp/site map.png\n".into()).unwrap();
        assert_eq!(p.state().get_value("t.name"), Some("/tmp/site map.png"));
    }
}

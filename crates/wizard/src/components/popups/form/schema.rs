use super::FormField;

/// Title, optional description and ordered fields of a form.
pub struct FormSchema {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FormField>,
    pub min_width: u16,
    pub min_height: u16,
}

impl FormSchema {
    pub fn new(title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields,
            min_width: 72,
            min_height: 24,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Override minimum size hints (clamped to sensible lower bounds).
    pub fn min_size(mut self, w: u16, h: u16) -> Self {
        self.min_width = w.max(40);
        self.min_height = h.max(10);
        self
    }

    pub fn field_by_key(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }
}

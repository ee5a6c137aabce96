use std::collections::HashMap;

/// Values and validation messages of a form being edited.
///
/// Values are kept as entered; the session parses them on submit.
#[derive(Debug, Default, Clone)]
pub struct FormState {
    pub values: HashMap<String, String>,
    pub errors: HashMap<String, String>,
    /// Messages not tied to one field, e.g. a rejected submit.
    pub global_errors: Vec<String>,
}

impl FormState {
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn clear_validation(&mut self) {
        self.errors.clear();
        self.global_errors.clear();
    }
}

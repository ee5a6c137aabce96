//! Form field kinds and metadata.

type Validator = Box<dyn Fn(&str) -> std::result::Result<(), String> + Send + Sync>;

/// Input widget of a form field.
///
/// - Text / Path / Number edit as single-line text
/// - Slider steps through an integer range with Left/Right
/// - Select cycles through its options with Left/Right
#[derive(Debug, Clone, PartialEq)]
pub enum FormFieldKind {
    Text,
    Path,
    Number,
    Slider { min: i64, max: i64, step: i64 },
    Select { options: Vec<String> },
}

pub struct FormField {
    pub key: String,
    pub label: String,
    pub kind: FormFieldKind,
    pub required: bool,
    pub help: Option<String>,
    pub validator: Option<Validator>,
}

impl FormField {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FormFieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: false,
            help: None,
            validator: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Hint shown beneath the field.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// `Err(message)` is shown inline and blocks submission.
    pub fn validator(
        mut self,
        f: impl Fn(&str) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(f));
        self
    }

    pub fn is_textual(&self) -> bool {
        matches!(
            self.kind,
            FormFieldKind::Text | FormFieldKind::Path | FormFieldKind::Number
        )
    }
}

use pdd_core::Section;
use strum::Display;

/// Raw text per field key, as entered in a form.
pub type FormValues = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Display)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    Error(String),
    Update,
    Submit,
    Navigate(usize),
    NextPage,
    PrevPage,
    /// Open the form of a wizard step.
    OpenForm(Section),
    /// A form passed its field validators.
    FormSubmitted {
        section: Section,
        values: FormValues,
    },
    /// The session refused a submitted form; the form stays open.
    FormRejected(String),
    /// A section was committed to the session.
    SectionSaved(Section),
    Estimate,
    Export,
    ToggleDump,
    Alert {
        title: String,
        message: String,
    },
    ClosePopup,
}

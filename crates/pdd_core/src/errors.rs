use std::path::PathBuf;

use thiserror::Error;

/// Rejected value at the input boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} is not a valid number: {raw:?}")]
    InvalidNumber { field: &'static str, raw: String },

    #[error("{field} must be one of: {}", .options.join(", "))]
    UnknownOption {
        field: &'static str,
        options: &'static [&'static str],
    },

    #[error("{field}: file {path:?} does not exist")]
    MissingFile { field: &'static str, path: String },
}

/// Reading a file upload into memory failed or exceeded the caller's limit.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("could not read upload {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("upload {path:?} is {size} bytes, limit is {limit}")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
}

#[derive(Error, Debug)]
pub enum TemplateRenderError {
    #[error("template not found: {path:?}")]
    TemplateMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template {path:?} is not a valid DOCX archive: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("template part {part} is not valid UTF-8")]
    Encoding { part: String },

    #[error("unterminated placeholder in {part} at byte {offset}")]
    MalformedPlaceholder { part: String, offset: usize },

    #[error("required placeholders missing from context: {}", .0.join(", "))]
    MissingPlaceholders(Vec<String>),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SessionError {
    /// A step was invoked before the step it depends on was completed.
    #[error("{step} needs {} first", .missing.join(", "))]
    PrerequisiteMissing {
        step: &'static str,
        missing: Vec<String>,
    },

    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Render(#[from] TemplateRenderError),

    /// The rendered document could not be written to its destination.
    #[error("could not save {path:?}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

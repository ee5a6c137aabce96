//! Core of the agroforestry PDD wizard.
//!
//! - [`store`]: session-scoped key/value store the wizard steps write into
//! - [`estimator`]: carbon-credit estimate from the project inputs
//! - [`render`] / [`template`]: DOCX template fill for the PDD download
//! - [`catalog`]: declarative wizard steps and fields (no UI dependency)
//! - [`session`]: ties the above together per user session
//!
//! Nothing in here knows about the terminal UI; the `wizard` binary drives it.

pub mod catalog;
pub mod errors;
pub mod estimator;
pub mod inputs;
pub mod render;
pub mod session;
pub mod store;
pub mod template;

pub use catalog::{FieldKind, FieldSpec, Section};
pub use errors::{InputError, SessionError, TemplateRenderError, UploadError};
pub use estimator::{EstimationResult, Methodology, estimate, format_tons};
pub use inputs::{ProjectInputs, Species};
pub use render::{DOCX_MIME_TYPE, DocumentRenderer};
pub use session::{Session, SessionState};
pub use store::{FormData, FormStore, FormValue, Upload};

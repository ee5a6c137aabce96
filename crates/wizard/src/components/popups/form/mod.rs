//! Declarative multi-field form popup.
//!
//! - `field.rs`  : `FormFieldKind`, `FormField`
//! - `schema.rs` : `FormSchema`
//! - `state.rs`  : `FormState` (entered values and validation errors)
//! - `popup.rs`  : `FormPopup` (navigation, editing, submission)
//! - `render.rs` : drawing
mod field;
mod popup;
mod render;
mod schema;
mod state;

pub use field::{FormField, FormFieldKind};
pub use popup::FormPopup;
pub use schema::FormSchema;
pub use state::FormState;

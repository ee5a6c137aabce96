//! Modal popups: the section form, alerts and the form-data dump.
pub mod alert;
pub mod dump;
pub mod form;

pub use crate::components::popup::{centered_rect_fixed, draw_popup_frame, render_backdrop};

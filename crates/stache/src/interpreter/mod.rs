//! Template interpreter.
//!
//! Renders parsed templates against a [`Context`]. The context supplies
//! variables, helpers, block-parameter helpers, partials, and the output
//! escaper; the evaluator itself holds no state between calls.

mod context;
mod error;
mod escape;
mod evaluator;
mod helpers;
mod registry;

pub use context::{Context, PartialScope, SimpleContext};
pub use error::RenderError;
pub use escape::{Escaper, HtmlEscaper, NoEscape};
pub use helpers::{AsHelper, Helper, Partial};
pub use registry::{HELPER_MISSING, Registry};

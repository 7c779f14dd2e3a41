//! Prompt System - generation templates and feedback prompt rendering
//!
//! `Template` holds the evolving generation prompt with its `{product}` and
//! `{n}` slots. `PromptRenderer` renders the Handlebars feedback prompt sent
//! to the refiner.

mod render;
mod template;

pub use render::{DEFAULT_FEEDBACK_PROMPT, FeedbackContext, PromptRenderer};
pub use template::{COUNT_SLOT, DEFAULT_TEMPLATE, PRODUCT_SLOT, Template};

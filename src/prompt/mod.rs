//! Prompt templates: built-in defaults, stored overrides, and rendering.

pub mod command;
pub mod render;
pub mod store;
pub mod templates;

pub use command::{edit_template, reset_template, show_template};
pub use render::{TemplateVars, render};
pub use store::TemplateStore;
pub use templates::{DEFAULT_BRANCH_TEMPLATE, DEFAULT_COMMIT_TEMPLATE, TemplateKind};

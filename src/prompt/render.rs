//! `{{ name }}` placeholder substitution against a fixed allow-list.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

use crate::config::{CommitType, Config};

use super::templates::{TemplateKind, format_rule, rubric};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("Invalid regex"));

/// Runtime values a template may reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars {
    pub locale: String,
    pub max_length: usize,
    pub commit_type: Option<CommitType>,
}

impl TemplateVars {
    pub fn from_config(config: &Config) -> Self {
        Self {
            locale: config.locale.clone(),
            max_length: config.max_length,
            commit_type: config.commit_type,
        }
    }

    /// Value for an allowed placeholder, or `None` if `name` is not
    /// recognized for `kind`.
    fn resolve(&self, kind: TemplateKind, name: &str) -> Option<String> {
        let value = match (kind, name) {
            (_, "locale") => self.locale.clone(),
            (_, "maxLength") => self.max_length.to_string(),
            (TemplateKind::Commit, "commitType") | (TemplateKind::Branch, "branchType") => {
                rubric(kind, self.commit_type).to_string()
            }
            (TemplateKind::Commit, "commitRule") | (TemplateKind::Branch, "branchRule") => {
                format_rule(kind, self.commit_type).to_string()
            }
            _ => return None,
        };
        Some(value)
    }
}

/// Substitute every `{{ name }}` token. Unknown names render as empty.
pub fn render(template: &str, kind: TemplateKind, vars: &TemplateVars) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            vars.resolve(kind, &caps[1]).unwrap_or_default()
        })
        .into_owned()
}

//! Built-in instruction templates and the type rubrics they embed.

use crate::config::CommitType;

/// Default instructions for commit-message generation.
pub const DEFAULT_COMMIT_TEMPLATE: &str = "\
Generate a concise git commit message written in present tense for the following code diff with the given specifications below:
Message language: {{ locale }}
Commit message must be a maximum of {{ maxLength }} characters.
Exclude anything unnecessary such as translation. Your entire response will be passed directly into git commit.
{{ commitType }}
The output response must be in format:
{{ commitRule }}
The commit message subject must start with a lower-case letter. Do not capitalize the first word.
The commit message subject must be in the present tense. Do not use past tense.";

/// Default instructions for branch-name generation.
pub const DEFAULT_BRANCH_TEMPLATE: &str = "\
Generate a concise and conventional git branch name for the following code diff with the given specifications below:
Branch name must use only lowercase letters, numbers, and hyphens.
Use the format: {{ branchRule }}
Choose a type from the list: feat, fix, docs, style, refactor, perf, test, build, ci, chore, revert.
The short description must be in kebab-case and summarize the changes.
Exclude anything unnecessary such as translation or explanations. Respond with only the branch name.
{{ branchType }}";

const COMMIT_RUBRIC_CONVENTIONAL: &str = r#"Choose a type from the type-to-description JSON below that best describes the git diff:
{
  "docs": "Documentation only changes",
  "style": "Changes that do not affect the meaning of the code (white-space, formatting, missing semi-colons, etc)",
  "refactor": "A code change that neither fixes a bug nor adds a feature",
  "perf": "A code change that improves performance",
  "test": "Adding missing tests or correcting existing tests",
  "build": "Changes that affect the build system or external dependencies",
  "ci": "Changes to our CI configuration files and scripts",
  "chore": "Other changes that don't modify src or test files",
  "revert": "Reverts a previous commit",
  "feat": "A new feature",
  "fix": "A bug fix"
}"#;

const BRANCH_RUBRIC_CONVENTIONAL: &str = r#"Choose a type from the type-to-description JSON below that best describes the git diff:
{
  "feat": "A new feature",
  "fix": "A bug fix",
  "docs": "Documentation only changes",
  "style": "Changes that do not affect the meaning of the code (white-space, formatting, etc)",
  "refactor": "A code change that neither fixes a bug nor adds a feature",
  "perf": "A code change that improves performance",
  "test": "Adding missing tests or correcting existing tests",
  "build": "Changes that affect the build system or external dependencies",
  "ci": "Changes to our CI configuration files and scripts",
  "chore": "Other changes that don't modify src or test files",
  "revert": "Reverts a previous commit"
}"#;

const COMMIT_RULE_PLAIN: &str = "<commit message>";
const BRANCH_RULE_PLAIN: &str = "<branch name>";

/// Which template a store or render call operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Commit,
    Branch,
}

impl TemplateKind {
    pub fn default_template(&self) -> &'static str {
        match self {
            TemplateKind::Commit => DEFAULT_COMMIT_TEMPLATE,
            TemplateKind::Branch => DEFAULT_BRANCH_TEMPLATE,
        }
    }

    /// File name inside the config directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateKind::Commit => "prompt",
            TemplateKind::Branch => "branch-prompt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemplateKind::Commit => "Prompt",
            TemplateKind::Branch => "Branch prompt",
        }
    }
}

/// Type rubric for `kind`, empty when no type is configured.
pub fn rubric(kind: TemplateKind, commit_type: Option<CommitType>) -> &'static str {
    match (kind, commit_type) {
        (TemplateKind::Commit, Some(CommitType::Conventional)) => COMMIT_RUBRIC_CONVENTIONAL,
        (TemplateKind::Branch, Some(CommitType::Conventional)) => BRANCH_RUBRIC_CONVENTIONAL,
        (_, None) => "",
    }
}

/// Required output format for `kind`.
pub fn format_rule(kind: TemplateKind, commit_type: Option<CommitType>) -> &'static str {
    match (kind, commit_type) {
        (TemplateKind::Commit, Some(CommitType::Conventional)) => {
            "<type>(<optional scope>): <commit message>"
        }
        (TemplateKind::Branch, Some(CommitType::Conventional)) => {
            "<type>/<short-description-with-kebab-case>"
        }
        (TemplateKind::Commit, None) => COMMIT_RULE_PLAIN,
        (TemplateKind::Branch, None) => BRANCH_RULE_PLAIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rubrics_are_valid_json_maps() {
        for kind in [TemplateKind::Commit, TemplateKind::Branch] {
            let rubric = rubric(kind, Some(CommitType::Conventional));
            let (_, json) = rubric.split_once('\n').unwrap();
            let parsed: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(json).unwrap();
            assert_eq!(parsed.len(), 11);
            assert!(parsed.contains_key("feat"));
            assert!(parsed.contains_key("fix"));
        }
    }

    #[test]
    fn test_plain_type_has_no_rubric() {
        assert_eq!(rubric(TemplateKind::Commit, None), "");
        assert_eq!(format_rule(TemplateKind::Commit, None), "<commit message>");
        assert_eq!(format_rule(TemplateKind::Branch, None), "<branch name>");
    }

    #[test]
    fn test_defaults_reference_their_placeholders() {
        assert!(DEFAULT_COMMIT_TEMPLATE.contains("{{ commitType }}"));
        assert!(DEFAULT_COMMIT_TEMPLATE.contains("{{ commitRule }}"));
        assert!(DEFAULT_BRANCH_TEMPLATE.contains("{{ branchRule }}"));
        assert!(DEFAULT_BRANCH_TEMPLATE.contains("{{ branchType }}"));
    }
}

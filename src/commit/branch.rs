//! Branch name candidates and the timestamp fallback.

use chrono::Utc;

use crate::config::Config;
use crate::error::GenerateError;
use crate::llm::TextGenerator;
use crate::prompt::TemplateKind;

pub const FALLBACK_BRANCH_PREFIX: &str = "ai-branch-";

/// Generate deduplicated branch name candidates for `diff`.
pub async fn generate_branch_names<G>(
    generator: &G,
    config: &Config,
    template: &str,
    diff: &str,
) -> Result<Vec<String>, GenerateError>
where
    G: TextGenerator + ?Sized,
{
    super::generate_candidates(generator, TemplateKind::Branch, template, config, diff).await
}

/// `ai-branch-<unix millis>`.
pub fn fallback_branch_name() -> String {
    format!("{}{}", FALLBACK_BRANCH_PREFIX, Utc::now().timestamp_millis())
}

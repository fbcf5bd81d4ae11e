//! Commit message candidates.

use crate::config::Config;
use crate::error::GenerateError;
use crate::llm::TextGenerator;
use crate::prompt::TemplateKind;

/// Generate deduplicated commit message candidates for `diff`.
///
/// An empty list means the model produced no usable text; the caller asks
/// the user to retry.
pub async fn generate_commit_messages<G>(
    generator: &G,
    config: &Config,
    template: &str,
    diff: &str,
) -> Result<Vec<String>, GenerateError>
where
    G: TextGenerator + ?Sized,
{
    super::generate_candidates(generator, TemplateKind::Commit, template, config, diff).await
}

//! The `commit` command: branch check, file detection, AI generation, and
//! the final git commit.

pub mod branch;
pub mod flow;
pub mod message;

use tracing::debug;

use crate::config::Config;
use crate::error::GenerateError;
use crate::llm::{GenerationRequest, TextGenerator, normalize_candidates};
use crate::prompt::{TemplateKind, TemplateVars, render};

pub use branch::{FALLBACK_BRANCH_PREFIX, fallback_branch_name, generate_branch_names};
pub use flow::{CommitContext, CommitFlow, CommitOverrides, Outcome};
pub use message::generate_commit_messages;

/// Render `template`, ask the model for `config.generate` candidates, and
/// normalize the result.
async fn generate_candidates<G>(
    generator: &G,
    kind: TemplateKind,
    template: &str,
    config: &Config,
    diff: &str,
) -> Result<Vec<String>, GenerateError>
where
    G: TextGenerator + ?Sized,
{
    let request = GenerationRequest {
        instructions: render(template, kind, &TemplateVars::from_config(config)),
        diff: diff.to_string(),
        candidate_count: config.generate,
    };

    let raw = generator.generate(&request).await?;
    let raw_count = raw.len();
    let candidates = normalize_candidates(raw);
    debug!(
        "{}: {} raw candidate(s), {} after normalization",
        kind.label(),
        raw_count,
        candidates.len()
    );
    Ok(candidates)
}

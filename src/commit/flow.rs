//! The commit state machine.
//!
//! `BranchCheck -> FileDetection -> AIGeneration -> GitCommit`, with graceful
//! exits for "no files" and user cancellation at any prompt.

use tracing::{debug, warn};

use crate::config::{BranchPolicy, CommitType, Config, MAX_CANDIDATES};
use crate::error::{CommitError, SessionError};
use crate::git::{Git, GitRunner};
use crate::llm::TextGenerator;
use crate::prompt::{TemplateKind, TemplateStore};
use crate::session::{Answer, SelectOption, Session};

use super::branch::{fallback_branch_name, generate_branch_names};
use super::message::generate_commit_messages;

pub const NO_FILES_MESSAGE: &str = "No worked files found";
pub const CANCELLED_MESSAGE: &str = "Commit cancelled";
pub const COMMITTED_MESSAGE: &str = "Successfully committed";

/// Flags given to `commit` on the command line.
#[derive(Debug, Clone, Default)]
pub struct CommitOverrides {
    pub generate: Option<u8>,
    pub all: bool,
    pub commit_type: Option<CommitType>,
    pub excludes: Vec<String>,
}

/// Settings for one run, built once and passed to every step.
#[derive(Debug, Clone)]
pub struct CommitContext {
    pub config: Config,
    pub all: bool,
    pub excludes: Vec<String>,
}

impl CommitContext {
    pub fn new(mut config: Config, overrides: CommitOverrides) -> Self {
        if let Some(n) = overrides.generate {
            config.generate = n.clamp(1, MAX_CANDIDATES);
        }
        if let Some(commit_type) = overrides.commit_type {
            config.commit_type = Some(commit_type);
        }
        Self {
            config,
            all: overrides.all,
            excludes: overrides.excludes,
        }
    }
}

/// How a run ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Committed {
        message: String,
        branch: Option<String>,
    },
    NoFiles,
    Cancelled,
}

enum Step<T> {
    Next(T),
    End(Outcome),
}

pub struct CommitFlow<'a, R, G, S>
where
    R: GitRunner,
    G: TextGenerator + ?Sized,
    S: Session + ?Sized,
{
    git: &'a Git<R>,
    generator: &'a G,
    templates: &'a TemplateStore,
    session: &'a mut S,
}

impl<'a, R, G, S> CommitFlow<'a, R, G, S>
where
    R: GitRunner,
    G: TextGenerator + ?Sized,
    S: Session + ?Sized,
{
    pub fn new(
        git: &'a Git<R>,
        generator: &'a G,
        templates: &'a TemplateStore,
        session: &'a mut S,
    ) -> Self {
        Self {
            git,
            generator,
            templates,
            session,
        }
    }

    pub async fn run(&mut self, ctx: &CommitContext) -> Result<Outcome, CommitError> {
        ctx.config.require_api_key()?;

        let branch = match self.check_branch(ctx).await? {
            Step::Next(branch) => branch,
            Step::End(outcome) => return Ok(outcome),
        };

        let diff = match self.collect_diff(ctx).await? {
            Step::Next(diff) => diff,
            Step::End(outcome) => return Ok(outcome),
        };

        let message = match self.choose_message(ctx, &diff).await? {
            Step::Next(message) => message,
            Step::End(outcome) => return Ok(outcome),
        };

        self.git.commit(&message).await?;
        self.session.complete(COMMITTED_MESSAGE);

        Ok(Outcome::Committed { message, branch })
    }

    fn cancel(&mut self) -> Outcome {
        self.session.done(CANCELLED_MESSAGE);
        Outcome::Cancelled
    }

    /// Create a new branch first when HEAD is the remote's default branch.
    async fn check_branch(&mut self, ctx: &CommitContext) -> Result<Step<Option<String>>, CommitError> {
        let current = self.git.current_branch().await?;
        let Some(default) = self.git.default_branch().await? else {
            return Ok(Step::Next(None));
        };
        if current != default {
            debug!("On '{}', default is '{}'; no new branch needed", current, default);
            return Ok(Step::Next(None));
        }

        self.session.note(
            &format!("You are on '{default}'. A new branch will be created for this commit."),
            "Default branch",
        );

        let name = match self.branch_name(ctx).await? {
            Answer::Value(name) => name,
            Answer::Cancelled => return Ok(Step::End(self.cancel())),
        };

        self.session.spinner_start("Creating branch");
        self.git.create_and_checkout_branch(&name).await?;
        self.session
            .spinner_stop(&format!("Switched to a new branch '{name}'"));

        Ok(Step::Next(Some(name)))
    }

    async fn branch_name(&mut self, ctx: &CommitContext) -> Result<Answer<String>, CommitError> {
        let diff = self.branch_diff(&ctx.excludes).await?;
        let policy = ctx.config.branch_policy;

        let generated = if diff.trim().is_empty() {
            debug!("No tracked changes to name a branch after");
            Ok(Vec::new())
        } else {
            let template = self.templates.load(TemplateKind::Branch)?;
            self.session.spinner_start("Generating branch name");
            let result =
                generate_branch_names(self.generator, &ctx.config, &template, &diff).await;
            self.session.spinner_stop(match &result {
                Ok(names) if !names.is_empty() => "Branch name generated",
                _ => "Branch name generation failed",
            });
            result
        };

        match (generated, policy) {
            (Ok(names), _) if !names.is_empty() => Ok(self.pick(
                names,
                "Branch name",
                "Use this branch name?",
                "Pick a branch name to use",
            )?),
            (Ok(_), BranchPolicy::Strict) => Err(CommitError::NoBranchNames),
            (Err(e), BranchPolicy::Strict) => Err(e.into()),
            (Ok(_), BranchPolicy::Fallback) => {
                Ok(Answer::Value(self.fallback("No branch names were generated.")))
            }
            (Err(e), BranchPolicy::Fallback) => {
                warn!("Branch name generation failed: {}", e);
                Ok(Answer::Value(self.fallback(&e.to_string())))
            }
        }
    }

    fn fallback(&mut self, reason: &str) -> String {
        let name = fallback_branch_name();
        debug!("Using fallback branch name {}", name);
        self.session
            .note(&format!("{reason}\nUsing {name} instead."), "Fallback branch name");
        name
    }

    /// Staged diff followed by the unstaged diff of tracked files.
    async fn branch_diff(&self, excludes: &[String]) -> Result<String, CommitError> {
        let staged = self.git.diff(excludes).await?;
        let unstaged = self.git.unstaged_diff(excludes).await?;
        Ok(match (staged.is_empty(), unstaged.is_empty()) {
            (false, false) => format!("{staged}\n{unstaged}"),
            (false, true) => staged,
            _ => unstaged,
        })
    }

    async fn collect_diff(&mut self, ctx: &CommitContext) -> Result<Step<String>, CommitError> {
        let excludes = &ctx.excludes;

        if ctx.all {
            self.session.spinner_start("Staging all changes");
            self.git.stage_all().await?;
            self.session.spinner_stop("Staged all changes");
        }

        self.session.spinner_start("Detecting staged files");
        let staged = self.git.staged(excludes).await?;
        if !staged.files.is_empty() {
            self.session.spinner_stop("Staged files detected");
            self.session.note(
                &staged.files.join("\n"),
                &format!("Staged {} file(s)", staged.files.len()),
            );
            return Ok(Step::Next(staged.diff));
        }

        self.session.spinner_message("Detecting the worked files");
        let sets = self.git.file_sets(excludes).await?;
        if sets.is_empty() {
            self.session.spinner_stop("No changes detected");
            self.session.done(NO_FILES_MESSAGE);
            return Ok(Step::End(Outcome::NoFiles));
        }
        self.session.spinner_stop("Worked files detected");
        let worked = sets.worked_files();

        let options: Vec<SelectOption> = worked
            .iter()
            .map(|file| {
                let option = SelectOption::new(&file.path);
                if file.untracked {
                    option.with_hint("Untracked")
                } else {
                    option
                }
            })
            .collect();

        let selected = match self.session.multiselect("Select files to stage", &options)? {
            Answer::Value(selected) => selected,
            Answer::Cancelled => return Ok(Step::End(self.cancel())),
        };

        let paths: Vec<String> = selected
            .into_iter()
            .filter_map(|i| worked.get(i).map(|f| f.path.clone()))
            .collect();
        if paths.is_empty() {
            self.session.done(NO_FILES_MESSAGE);
            return Ok(Step::End(Outcome::NoFiles));
        }

        self.git.stage(&paths).await?;
        let diff = self.git.diff(excludes).await?;
        Ok(Step::Next(diff))
    }

    async fn choose_message(
        &mut self,
        ctx: &CommitContext,
        diff: &str,
    ) -> Result<Step<String>, CommitError> {
        let template = self.templates.load(TemplateKind::Commit)?;
        self.session.spinner_start(if ctx.config.generate > 1 {
            "Generating commit messages"
        } else {
            "Generating commit message"
        });

        let messages =
            match generate_commit_messages(self.generator, &ctx.config, &template, diff).await {
                Ok(messages) if !messages.is_empty() => messages,
                Ok(_) => {
                    self.session.spinner_stop("Changes analyzed");
                    return Err(CommitError::NoCommitMessages);
                }
                Err(e) => {
                    self.session.spinner_stop("Failed to generate commit message");
                    return Err(e.into());
                }
            };
        self.session.spinner_stop("Changes analyzed");

        Ok(match self.pick(
            messages,
            "Commit message",
            "Use this commit message?",
            "Pick a commit message to use",
        )? {
            Answer::Value(message) => Step::Next(message),
            Answer::Cancelled => Step::End(self.cancel()),
        })
    }

    /// A single candidate is shown and confirmed; several are selected from.
    /// Declining the single candidate counts as cancellation.
    fn pick(
        &mut self,
        candidates: Vec<String>,
        title: &str,
        confirm_prompt: &str,
        select_prompt: &str,
    ) -> Result<Answer<String>, SessionError> {
        if let [only] = candidates.as_slice() {
            self.session.note(only, title);
            return Ok(match self.session.confirm(confirm_prompt)?.value() {
                Some(true) => Answer::Value(only.clone()),
                _ => Answer::Cancelled,
            });
        }

        let options: Vec<SelectOption> = candidates.iter().map(SelectOption::new).collect();
        Ok(match self.session.select(select_prompt, &options)? {
            Answer::Value(i) => candidates.into_iter().nth(i).into(),
            Answer::Cancelled => Answer::Cancelled,
        })
    }
}

//! ai-commit - CLI entry point.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dialoguer::console::style;
use tracing_subscriber::EnvFilter;

use ai_commit::commit::{CommitContext, CommitFlow, CommitOverrides};
use ai_commit::config::{CommitType, ConfigKey, ConfigStore, MAX_CANDIDATES, parse_assignment};
use ai_commit::git::{Git, SystemGit};
use ai_commit::llm::GeminiClient;
use ai_commit::prompt::{
    TemplateKind, TemplateStore, edit_template, reset_template, show_template,
};
use ai_commit::session::TerminalSession;

/// Environment variable holding a tracing filter directive.
const LOG_ENV_VAR: &str = "AI_COMMIT_LOG";

/// Generate git commit messages and branch names from your diff using Gemini.
#[derive(Parser, Debug)]
#[command(name = "ai-commit")]
#[command(about = "Generate git commit messages and branch names from your diff using Gemini")]
#[command(version)]
struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a commit message for the current changes and commit
    Commit(CommitArgs),

    /// Show, edit, or reset the instruction template
    Prompt {
        #[command(subcommand)]
        action: PromptAction,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
struct CommitArgs {
    /// Number of candidate messages to generate
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=MAX_CANDIDATES as i64))]
    generate: Option<u8>,

    /// Stage all tracked and untracked changes before committing
    #[arg(short, long)]
    all: bool,

    /// Commit message convention
    #[arg(short, long = "type", value_enum)]
    commit_type: Option<CommitType>,

    /// Pathspec to leave out of file lists and diffs (repeatable)
    #[arg(short = 'x', long = "excludes")]
    excludes: Vec<String>,
}

#[derive(Args, Debug)]
struct TemplateTarget {
    /// Operate on the branch-name template instead of the commit template
    #[arg(long)]
    branch: bool,
}

impl TemplateTarget {
    fn kind(&self) -> TemplateKind {
        if self.branch {
            TemplateKind::Branch
        } else {
            TemplateKind::Commit
        }
    }
}

#[derive(Subcommand, Debug)]
enum PromptAction {
    /// Print the stored template
    Get(TemplateTarget),
    /// Open the stored template in your editor
    Set(TemplateTarget),
    /// Restore the built-in template
    Reset(TemplateTarget),
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print settings (all of them when no key is given)
    Get { keys: Vec<String> },
    /// Persist one or more KEY=VALUE settings
    Set {
        #[arg(required = true)]
        assignments: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", style("✖").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ai_commit=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Commit(args) => commit(args).await,
        Command::Prompt { action } => prompt(action),
        Command::Config { action } => config(action),
    }
}

async fn commit(args: CommitArgs) -> Result<()> {
    SystemGit::check_installed().context("git is required")?;

    let store = ConfigStore::locate()?;
    let ctx = CommitContext::new(
        store.load()?,
        CommitOverrides {
            generate: args.generate,
            all: args.all,
            commit_type: args.commit_type,
            excludes: args.excludes,
        },
    );
    let api_key = ctx.config.require_api_key()?;

    let root = Git::new(SystemGit::new())
        .toplevel()
        .await
        .context("Not a git repository. Run ai-commit from within a git repository.")?;
    let git = Git::new(SystemGit::in_dir(root));
    let generator = GeminiClient::from_config(&ctx.config, api_key)?;
    let templates = TemplateStore::new(store.dir());

    let mut session = TerminalSession::new();
    session.intro("ai-commit");
    CommitFlow::new(&git, &generator, &templates, &mut session)
        .run(&ctx)
        .await?;

    Ok(())
}

fn prompt(action: PromptAction) -> Result<()> {
    let store = ConfigStore::locate()?;
    let templates = TemplateStore::new(store.dir());

    let mut session = TerminalSession::new();
    match action {
        PromptAction::Get(target) => show_template(&templates, target.kind(), &mut session)?,
        PromptAction::Set(target) => edit_template(&templates, target.kind(), &mut session)?,
        PromptAction::Reset(target) => {
            reset_template(&templates, target.kind(), &mut session)?;
        }
    }

    Ok(())
}

fn config(action: ConfigAction) -> Result<()> {
    let store = ConfigStore::locate()?;

    match action {
        ConfigAction::Get { keys } => {
            let config = store.load()?;
            let keys = if keys.is_empty() {
                ConfigKey::ALL.to_vec()
            } else {
                keys.iter()
                    .map(|k| k.parse::<ConfigKey>())
                    .collect::<Result<Vec<_>, _>>()?
            };
            for key in keys {
                println!("{}={}", key, config.display_value(key));
            }
        }
        ConfigAction::Set { assignments } => {
            let parsed = assignments
                .iter()
                .map(|a| parse_assignment(a))
                .collect::<Result<Vec<_>, _>>()?;
            store.set(&parsed)?;
            println!("Saved {} setting(s) to {}", parsed.len(), store.path().display());
        }
    }

    Ok(())
}

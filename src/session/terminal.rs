//! [`Session`] on a real terminal, using dialoguer prompts and an indicatif
//! spinner.

use std::io;
use std::time::Duration;

use dialoguer::console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, MultiSelect, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::SessionError;

use super::{Answer, SelectOption, Session};

const SPINNER_CHARS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK_INTERVAL: Duration = Duration::from_millis(80);

#[derive(Default)]
pub struct TerminalSession {
    theme: ColorfulTheme,
    spinner: Option<ProgressBar>,
}

impl TerminalSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print the run header.
    pub fn intro(&mut self, title: &str) {
        println!("{}", style(format!(" {title} ")).black().on_cyan());
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .map(|s| s.tick_strings(SPINNER_CHARS))
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn clear_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}

/// Map a dialoguer result onto [`Answer`], treating Ctrl+C as cancellation.
fn answer<T>(result: dialoguer::Result<Option<T>>) -> Result<Answer<T>, SessionError> {
    match result {
        Ok(value) => Ok(value.into()),
        Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => {
            let _ = Term::stderr().show_cursor();
            Ok(Answer::Cancelled)
        }
        Err(e) => Err(SessionError::Terminal(e.to_string())),
    }
}

fn labels(options: &[SelectOption]) -> Vec<String> {
    options.iter().map(SelectOption::display).collect()
}

impl Session for TerminalSession {
    fn spinner_start(&mut self, label: &str) {
        self.clear_spinner();

        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message(label.to_string());
        pb.enable_steady_tick(TICK_INTERVAL);
        self.spinner = Some(pb);
    }

    fn spinner_message(&mut self, label: &str) {
        match &self.spinner {
            Some(pb) => pb.set_message(label.to_string()),
            None => self.spinner_start(label),
        }
    }

    fn spinner_stop(&mut self, label: &str) {
        self.clear_spinner();
        println!("{} {}", style("◇").green(), label);
    }

    fn note(&mut self, text: &str, title: &str) {
        self.clear_spinner();
        println!("{} {}", style("◇").green(), style(title).bold());
        for line in text.lines() {
            println!("{}  {}", style("│").dim(), line);
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<Answer<bool>, SessionError> {
        self.clear_spinner();
        answer(
            Confirm::with_theme(&self.theme)
                .with_prompt(prompt)
                .default(true)
                .interact_opt(),
        )
    }

    fn select(
        &mut self,
        prompt: &str,
        options: &[SelectOption],
    ) -> Result<Answer<usize>, SessionError> {
        self.clear_spinner();
        answer(
            Select::with_theme(&self.theme)
                .with_prompt(prompt)
                .items(&labels(options))
                .default(0)
                .interact_opt(),
        )
    }

    fn multiselect(
        &mut self,
        prompt: &str,
        options: &[SelectOption],
    ) -> Result<Answer<Vec<usize>>, SessionError> {
        self.clear_spinner();
        answer(
            MultiSelect::with_theme(&self.theme)
                .with_prompt(prompt)
                .items(&labels(options))
                .interact_opt(),
        )
    }

    fn done(&mut self, message: &str) {
        self.clear_spinner();
        println!("{} {}", style("└").dim(), message);
    }

    fn complete(&mut self, message: &str) {
        self.clear_spinner();
        println!("{} {}", style("└").green(), style(message).green());
    }
}

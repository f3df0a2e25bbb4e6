//! Console presentation layer for the walkthrough.
//!
//! Renders the interface's two panes in one terminal: the
//! chat transcript (agent commentary plus the stage timeline) and the
//! tool viewer (per-stage fixture content, streamed where the fixture
//! streams). The sequencer feeds this layer through its subscription; the
//! UI never mutates sequencer state except through `confirm()` at the
//! gate, driven by an explicit operator prompt.

pub mod icons;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

use crate::reveal::TextReveal;
use crate::stage::{StageStatus, ViewId};
use crate::substep::RevealedSubstep;
use crate::transcript::{self, StepMessage};
use crate::views;

/// Console renderer for the walkthrough.
pub struct WalkthroughUi {
    /// Multiplier applied to reveal intervals (matches the sequencer's
    /// stage-delay scaling so text keeps pace with the timeline)
    speed: f64,
}

impl WalkthroughUi {
    pub fn new(speed: f64) -> Self {
        Self { speed }
    }

    /// Greeting screen shown before the task is submitted.
    pub fn print_welcome(&self) {
        println!();
        println!("{}{}", icons::ROBOT, style(transcript::AGENT_NAME).bold());
        for line in transcript::WELCOME_MESSAGE.lines() {
            println!("  {line}");
        }
        println!();
    }

    pub fn print_user_task(&self, task: &str) {
        println!("{} {}", style("用户:").dim(), style(task).bold());
        println!();
    }

    /// An agent chat bubble.
    pub fn print_agent(&self, text: &str) {
        println!("{}{}", icons::ROBOT, style(transcript::AGENT_NAME).bold());
        for line in text.lines() {
            println!("  {line}");
        }
        println!();
    }

    /// A timeline entry flipping to in-progress.
    pub fn print_step_header(&self, message: &StepMessage) {
        println!(
            "{}{} {}",
            icons::CLOCK,
            style(message.title).bold(),
            style(message.time).dim()
        );
    }

    /// Live spinner carrying the entry's status text, shown while the
    /// stage's auto-advance delay runs down.
    pub fn status_spinner(&self, message: &StepMessage) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("    {spinner} {msg}")
                .expect("progress bar template is a valid static string"),
        );
        spinner.set_message(format!("正在{}...", message.status_text));
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    /// A timeline entry flipping to completed: the spinner collapses into
    /// a check line plus the tool chip the operator can jump back to.
    pub fn finish_step(&self, spinner: ProgressBar, message: &StepMessage) {
        spinner.finish_and_clear();
        self.print_step_footer(message);
    }

    /// Check line plus tool chip for a completed entry.
    pub fn print_step_footer(&self, message: &StepMessage) {
        println!(
            "    {}{}",
            icons::CHECK,
            style(format!("{} [{}]", message.tool_name, message.view)).dim()
        );
    }

    /// One revealed sub-step line.
    pub fn print_substep(&self, substep: &RevealedSubstep) {
        let marker = match substep.status {
            StageStatus::Completed => style("●").green(),
            _ => style("●").cyan(),
        };
        let state = match substep.status {
            StageStatus::Completed => "已完成",
            _ => "进行中",
        };
        println!("      {} {} - {}", marker, substep.title, state);
    }

    /// The confirmation gate. Returns whether the operator approved.
    pub fn confirm_gate(&self, auto_confirm: bool) -> Result<bool> {
        self.print_agent(transcript::CONFIRMATION_MESSAGE);
        println!(
            "  {}{}",
            icons::GATE,
            style(transcript::CONFIRMATION_HINT).dim()
        );

        if auto_confirm {
            println!("  {} (--yes flag)", style("Auto-approved").dim());
            println!();
            return Ok(true);
        }

        let approved = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("是否执行自动恢复策略？")
            .default(true)
            .interact()
            .context("Failed to read gate confirmation from the terminal")?;
        println!();
        Ok(approved)
    }

    /// Render a view into the tool pane: header, static lead-in, then the
    /// streaming transcript at the fixture's per-character speed.
    ///
    /// `started` is the view's start-rendering-now trigger: until it flips
    /// to true the streaming portion stays hidden, and each flip replays
    /// the stream from the empty prefix.
    pub async fn render_view(&self, view: ViewId, started: bool) {
        println!();
        println!(
            "  {}{} {}",
            icons::VIEW,
            style(views::title(view)).bold().underlined(),
            style(format!("[{view}]")).dim()
        );

        let body = views::body(view);
        if let Some(lead_in) = body.lead_in {
            print!("{lead_in}");
        }
        if started && let Some(stream) = body.stream {
            let interval = stream.char_interval().mul_f64(self.speed.max(0.001));
            self.stream_text(stream.text, interval).await;
        }
        println!();
    }

    /// Print a growing prefix to stdout, character by character.
    async fn stream_text(&self, text: &str, char_interval: Duration) {
        let reveal = TextReveal::new(text, char_interval);
        let mut handle = reveal.start();
        let mut printed = 0usize;
        while handle.changed().await {
            let frame = handle.snapshot();
            let chars: Vec<char> = frame.text.chars().collect();
            if chars.len() > printed {
                let delta: String = chars[printed..].iter().collect();
                print!("{delta}");
                let _ = std::io::stdout().flush();
                printed = chars.len();
            }
        }
        println!();
    }

    /// Wrap-up message and the verification report.
    pub fn print_final(&self) {
        self.print_agent(transcript::FINAL_MESSAGE);
        println!("{}", views::verification::render());
    }
}

//! Walkthrough playback — `drill run`.
//!
//! Wires the composition root together: configuration, the stage table,
//! the callback registry, the sequencer, and the console UI. The
//! sequencer owns all timing; this loop only reacts to its snapshots.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

use drill::callbacks::{CallbackRegistry, InteractionKind};
use drill::config::DrillConfig;
use drill::sequencer::{Sequencer, SequencerSnapshot};
use drill::stage::{Stage, StageStatus, ViewId, load_stages_or_default};
use drill::substep::{RevealedSubstep, SubstepRevealer};
use drill::transcript::{self, StepMessage};
use drill::ui::WalkthroughUi;

pub async fn run_walkthrough(
    task: Option<String>,
    speed: Option<f64>,
    yes: bool,
    stages_path: Option<PathBuf>,
) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    let config = DrillConfig::load_or_default(&cwd)?;

    let speed = speed.unwrap_or(config.speed);
    if !speed.is_finite() || speed <= 0.0 {
        anyhow::bail!("speed must be a positive number, got {}", speed);
    }
    let auto_confirm = yes || config.auto_confirm;
    // The sequencer rejects blank tasks silently; treat a blank --task as
    // "not provided" so the run always plays something
    let task = task
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| config.default_task.clone());
    let stages_path = stages_path.or(config.stages_file);

    let stages: Vec<Stage> = load_stages_or_default(stages_path.as_deref())?
        .iter()
        .map(|s| s.scaled(speed))
        .collect();

    let registry = CallbackRegistry::new();
    register_demo_handlers(&registry);

    let sequencer = Sequencer::new(stages.clone());
    let ui = WalkthroughUi::new(speed);

    let (tx, mut rx) = mpsc::unbounded_channel::<SequencerSnapshot>();
    sequencer.subscribe(move |snapshot| {
        let _ = tx.send(snapshot.clone());
    });

    ui.print_welcome();
    ui.print_user_task(&task);
    ui.print_agent(&transcript::intro_message(&task));

    sequencer.start(&task);

    let messages = transcript::step_messages();
    let mut last_step: i32 = -1;
    // Snapshots received while a stage handler was draining the channel
    let mut queued: VecDeque<SequencerSnapshot> = VecDeque::new();

    loop {
        let Some(snapshot) = next_event(&mut queued, &mut rx).await else {
            break;
        };

        if snapshot.complete {
            ui.print_final();
            break;
        }

        if snapshot.waiting_for_confirmation {
            if ui.confirm_gate(auto_confirm)? {
                sequencer.confirm();
            } else {
                ui.print_agent("已取消自动恢复，故障修复流程终止。");
                break;
            }
            continue;
        }

        // Manual view switches and duplicate snapshots carry no new stage
        if snapshot.step_index <= last_step || snapshot.step_index < 0 {
            continue;
        }
        let index = snapshot.step_index as usize;
        last_step = snapshot.step_index;
        let (Some(stage), Some(message)) = (stages.get(index), messages.get(index)) else {
            continue;
        };

        ui.print_step_header(message);
        trigger_scripted_interactions(&registry, stage.view, message);
        ui.render_view(stage.view, true).await;

        if stage.substeps.is_empty() {
            // Keep the status spinner alive until the sequencer moves on
            let spinner = ui.status_spinner(message);
            let next = next_event(&mut queued, &mut rx).await;
            ui.finish_step(spinner, message);
            match next {
                Some(snapshot) => queued.push_front(snapshot),
                None => break,
            }
        } else {
            let events = drive_substeps(&ui, stage, &mut rx).await;
            queued.extend(events);
            ui.print_step_footer(message);
        }
    }

    Ok(())
}

/// Pop a replayed snapshot first, then fall back to the live channel.
async fn next_event(
    queued: &mut VecDeque<SequencerSnapshot>,
    rx: &mut mpsc::UnboundedReceiver<SequencerSnapshot>,
) -> Option<SequencerSnapshot> {
    if let Some(snapshot) = queued.pop_front() {
        return Some(snapshot);
    }
    rx.recv().await
}

/// Reveal a stage's sub-steps while the stage runs. Snapshots arriving in
/// the meantime are collected and handed back so the main loop can replay
/// them in order; the reveal itself always runs to completion.
async fn drive_substeps(
    ui: &WalkthroughUi,
    stage: &Stage,
    rx: &mut mpsc::UnboundedReceiver<SequencerSnapshot>,
) -> Vec<SequencerSnapshot> {
    let revealer = SubstepRevealer::new(stage.substeps.clone());
    revealer.activate(StageStatus::InProgress);

    let mut events = Vec::new();
    let mut printed: Vec<Option<StageStatus>> = vec![None; stage.substeps.len()];
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    loop {
        for (i, status) in revealer.statuses().iter().enumerate() {
            if *status != StageStatus::Pending && printed[i] != Some(*status) {
                printed[i] = Some(*status);
                ui.print_substep(&RevealedSubstep {
                    title: stage.substeps[i].title.clone(),
                    status: *status,
                });
            }
        }
        if revealer.all_complete() && printed.iter().all(|p| *p == Some(StageStatus::Completed)) {
            return events;
        }

        tokio::select! {
            maybe = rx.recv() => match maybe {
                Some(snapshot) => events.push(snapshot),
                None => return events,
            },
            _ = ticker.tick() => {}
        }
    }
}

/// Demo handlers: surface every interaction in the trace log.
fn register_demo_handlers(registry: &CallbackRegistry) {
    for kind in InteractionKind::all() {
        let kind = *kind;
        registry.register(kind, move |data| {
            tracing::info!(kind = %kind, step = %data.step_name, "interaction observed");
        });
    }
}

/// The scripted run browses tools on the agent's behalf; publish the
/// matching interaction as each stage opens its view.
fn trigger_scripted_interactions(
    registry: &CallbackRegistry,
    view: ViewId,
    message: &StepMessage,
) {
    let mut metadata = serde_json::Map::new();
    metadata.insert("triggeredBy".into(), serde_json::json!("auto"));

    let kind = match view {
        ViewId::Alerts => InteractionKind::BrowseAlerts,
        ViewId::Analysis => InteractionKind::BrowseTopologyAnalysis,
        ViewId::Verification => InteractionKind::BrowseTopologyVerification,
        _ => return,
    };
    registry.trigger(kind, message.title, Some(metadata));
}

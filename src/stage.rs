//! Stage definitions and JSON loading for the drill walkthrough.
//!
//! This module provides:
//! - `ViewId` identifying the viewer pane content for a stage
//! - `Stage` / `SubstepSpec` describing one unit of the scripted workflow
//! - `StagesFile` for JSON-based stage table overrides
//! - The built-in six-stage fault-recovery table as a fallback

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::StageTableError;

/// Identifier of the viewer pane content associated with a stage.
///
/// This is a closed enumeration: the walkthrough only ever surfaces these
/// six tools, and a manual tool switch picks from the same set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewId {
    /// Fault-recovery plan document
    Plan,
    /// Network topology map
    Topology,
    /// Alert monitor
    Alerts,
    /// Root-cause analysis terminal
    Analysis,
    /// Recovery script execution terminal
    Recovery,
    /// Post-recovery verification report
    Verification,
}

impl ViewId {
    /// Returns all views in stage order.
    pub fn all() -> &'static [ViewId] {
        &[
            ViewId::Plan,
            ViewId::Topology,
            ViewId::Alerts,
            ViewId::Analysis,
            ViewId::Recovery,
            ViewId::Verification,
        ]
    }

    /// Returns the view name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::Plan => "plan",
            ViewId::Topology => "topology",
            ViewId::Alerts => "alerts",
            ViewId::Analysis => "analysis",
            ViewId::Recovery => "recovery",
            ViewId::Verification => "verification",
        }
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ViewId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plan" => Ok(ViewId::Plan),
            "topology" => Ok(ViewId::Topology),
            "alerts" => Ok(ViewId::Alerts),
            "analysis" => Ok(ViewId::Analysis),
            "recovery" => Ok(ViewId::Recovery),
            "verification" => Ok(ViewId::Verification),
            _ => anyhow::bail!(
                "Invalid view '{}'. Valid values: plan, topology, alerts, analysis, recovery, verification",
                s
            ),
        }
    }
}

/// Lifecycle status of a stage or sub-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum StageStatus {
    /// Not yet reached; never surfaced in the transcript
    #[default]
    Pending,
    /// Currently active
    InProgress,
    /// Finished
    Completed,
}

/// A finer-grained action nested within a stage's reveal sequence.
///
/// Both timers are measured from the moment the parent stage activates:
/// at `start_delay_ms` the sub-step becomes in-progress, and at
/// `start_delay_ms + duration_ms` it completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubstepSpec {
    /// Human-readable sub-step title
    pub title: String,
    /// Delay from parent activation until the sub-step starts
    pub start_delay_ms: u64,
    /// Time spent in-progress before completing
    pub duration_ms: u64,
}

impl SubstepSpec {
    pub fn new(title: &str, start_delay_ms: u64, duration_ms: u64) -> Self {
        Self {
            title: title.to_string(),
            start_delay_ms,
            duration_ms,
        }
    }

    /// Delay from parent activation until the sub-step completes.
    pub fn end_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms + self.duration_ms)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}

/// Represents a single stage of the scripted walkthrough.
///
/// The stage list is immutable after creation; the sequencer only ever
/// reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    /// Human-readable title shown in the transcript timeline
    pub title: String,
    /// One-line description of what the "agent" is doing
    pub description: String,
    /// Viewer pane content surfaced when this stage activates
    pub view: ViewId,
    /// Time to wait after activation before auto-advancing
    pub delay_ms: u64,
    /// When true, the sequencer suspends at the end of this stage and
    /// waits for an explicit confirmation before proceeding
    #[serde(default)]
    pub requires_confirmation: bool,
    /// Finer-grained actions revealed while this stage runs
    #[serde(default)]
    pub substeps: Vec<SubstepSpec>,
}

impl Stage {
    /// Create a stage with no sub-steps and no confirmation gate.
    pub fn new(title: &str, description: &str, view: ViewId, delay_ms: u64) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            view,
            delay_ms,
            requires_confirmation: false,
            substeps: Vec::new(),
        }
    }

    /// Mark this stage as a confirmation gate.
    pub fn with_confirmation(mut self) -> Self {
        self.requires_confirmation = true;
        self
    }

    /// Attach sub-steps to this stage.
    pub fn with_substeps(mut self, substeps: Vec<SubstepSpec>) -> Self {
        self.substeps = substeps;
        self
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Return a copy with all delays scaled by `factor` (sub-steps
    /// included). Scaled delays are clamped to at least 1ms so a large
    /// speed-up never produces a zero-length timer.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |ms: u64| ((ms as f64 * factor) as u64).max(1);
        Self {
            title: self.title.clone(),
            description: self.description.clone(),
            view: self.view,
            delay_ms: scale(self.delay_ms),
            requires_confirmation: self.requires_confirmation,
            substeps: self
                .substeps
                .iter()
                .map(|s| SubstepSpec {
                    title: s.title.clone(),
                    start_delay_ms: scale(s.start_delay_ms),
                    duration_ms: scale(s.duration_ms),
                })
                .collect(),
        }
    }
}

/// Represents the full stages.json file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagesFile {
    /// Free-form description of the scenario this table plays
    #[serde(default)]
    pub description: String,
    /// Ordered stage list
    pub stages: Vec<Stage>,
}

impl StagesFile {
    /// Load a stage table from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stages file: {}", path.display()))?;

        let stages_file: StagesFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse stages JSON: {}", path.display()))?;

        stages_file.validate()?;
        Ok(stages_file)
    }

    /// Save the stage table to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize stages to JSON")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write stages file: {}", path.display()))?;

        Ok(())
    }

    /// Reject tables the sequencer cannot play: an empty list, or a stage
    /// with a zero auto-advance delay.
    pub fn validate(&self) -> Result<(), StageTableError> {
        if self.stages.is_empty() {
            return Err(StageTableError::Empty);
        }
        for (i, stage) in self.stages.iter().enumerate() {
            if stage.delay_ms == 0 {
                return Err(StageTableError::ZeroDelay {
                    index: i,
                    title: stage.title.clone(),
                });
            }
        }
        Ok(())
    }
}

/// The built-in network-fault-recovery walkthrough.
///
/// Six stages; the analysis stage is a confirmation gate (an operator must
/// approve the remediation plan before the simulated switch-over runs),
/// and the recovery stage carries two back-to-back sub-steps.
pub fn default_stages() -> Vec<Stage> {
    vec![
        Stage::new(
            "查看计划详情",
            "制定详细的故障修复计划，分析故障范围和影响",
            ViewId::Plan,
            5000,
        ),
        Stage::new(
            "打开拓扑",
            "查看网络拓扑结构，识别故障节点和影响范围",
            ViewId::Topology,
            3000,
        ),
        Stage::new(
            "打开告警",
            "检查系统告警信息，确认故障类型和严重程度",
            ViewId::Alerts,
            3000,
        ),
        Stage::new(
            "分析故障情况",
            "进行故障根因分析，确定最佳修复方案",
            ViewId::Analysis,
            3000,
        )
        .with_confirmation(),
        Stage::new(
            "自动恢复",
            "生成并执行自动恢复策略，修复网络故障",
            ViewId::Recovery,
            8000,
        )
        .with_substeps(vec![
            SubstepSpec::new("生成恢复策略", 0, 2000),
            SubstepSpec::new("执行恢复策略", 2000, 4000),
        ]),
        Stage::new(
            "检测网络恢复",
            "验证修复效果，确认网络服务恢复正常",
            ViewId::Verification,
            3000,
        ),
    ]
}

/// Try to load a stage table from a file, falling back to the built-in
/// walkthrough if no path is given.
pub fn load_stages_or_default(stages_file: Option<&Path>) -> Result<Vec<Stage>> {
    match stages_file {
        Some(path) => {
            let sf = StagesFile::load(path)?;
            Ok(sf.stages)
        }
        None => Ok(default_stages()),
    }
}

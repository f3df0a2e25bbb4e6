//! Viewer pane content, one module per tool.
//!
//! Each view is fixture content rendered on a "start now" trigger; the
//! sequencer never looks inside a view. A view body has an optional
//! static lead-in (node grids, alert cards) and an optional streaming
//! transcript revealed character by character.

use std::time::Duration;

use crate::stage::ViewId;

pub mod alerts;
pub mod analysis;
pub mod plan;
pub mod recovery;
pub mod topology;
pub mod verification;

/// A streaming portion of a view, with its fixture reveal speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamSpec {
    pub text: &'static str,
    pub char_interval_ms: u64,
}

impl StreamSpec {
    pub fn char_interval(&self) -> Duration {
        Duration::from_millis(self.char_interval_ms)
    }
}

/// Renderable content of one view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewBody {
    /// Pre-rendered static portion, shown immediately
    pub lead_in: Option<String>,
    /// Typewriter portion, revealed over time
    pub stream: Option<StreamSpec>,
}

/// Header title shown above the viewer pane.
pub fn title(view: ViewId) -> &'static str {
    match view {
        ViewId::Plan => "故障修复计划",
        ViewId::Topology => "网络拓扑图",
        ViewId::Alerts => "系统告警",
        ViewId::Analysis => "故障诊断分析",
        ViewId::Recovery => "自动恢复",
        ViewId::Verification => "恢复验证",
    }
}

/// Assemble the body for a view.
pub fn body(view: ViewId) -> ViewBody {
    match view {
        ViewId::Plan => ViewBody {
            lead_in: None,
            stream: Some(StreamSpec {
                text: plan::PLAN_DOCUMENT,
                char_interval_ms: plan::REVEAL_MS,
            }),
        },
        ViewId::Topology => ViewBody {
            lead_in: Some(topology::render_nodes()),
            stream: Some(StreamSpec {
                text: topology::STATUS_LINE,
                char_interval_ms: topology::REVEAL_MS,
            }),
        },
        ViewId::Alerts => ViewBody {
            lead_in: Some(alerts::render()),
            stream: None,
        },
        ViewId::Analysis => ViewBody {
            lead_in: None,
            stream: Some(StreamSpec {
                text: analysis::TRANSCRIPT,
                char_interval_ms: analysis::REVEAL_MS,
            }),
        },
        ViewId::Recovery => ViewBody {
            lead_in: None,
            stream: Some(StreamSpec {
                text: recovery::TRANSCRIPT,
                char_interval_ms: recovery::REVEAL_MS,
            }),
        },
        ViewId::Verification => ViewBody {
            lead_in: Some(verification::render()),
            stream: None,
        },
    }
}

//! Chat transcript fixtures for the scripted walkthrough.
//!
//! The transcript pane shows the user's task, the agent's running
//! commentary, and a timeline entry per stage. All text here is fixture
//! content; the sequencer decides *when* each piece surfaces.

use crate::sequencer::SequencerSnapshot;
use crate::stage::{StageStatus, ViewId};

/// Display name of the simulated agent.
pub const AGENT_NAME: &str = "UI智能体";

/// One timeline entry in the chat transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct StepMessage {
    /// What the agent claims to be doing
    pub title: &'static str,
    /// The tool chip shown under completed entries
    pub tool_name: &'static str,
    /// Live status line shown while the entry is in progress
    pub status_text: &'static str,
    /// Display timestamp (scripted, not wall clock)
    pub time: &'static str,
    /// Tool pane the entry links back to
    pub view: ViewId,
}

/// The six timeline entries, in stage order.
pub fn step_messages() -> Vec<StepMessage> {
    vec![
        StepMessage {
            title: "查看计划详情 - 制定详细的故障修复计划，分析故障范围和影响",
            tool_name: "计划文档工具",
            status_text: "生成故障修复计划文档",
            time: "14:30",
            view: ViewId::Plan,
        },
        StepMessage {
            title: "查看网络拓扑结构，识别故障节点和影响范围",
            tool_name: "浏览网络拓扑图页面",
            status_text: "加载网络拓扑图，分析节点状态",
            time: "14:32",
            view: ViewId::Topology,
        },
        StepMessage {
            title: "检查系统告警信息，确认故障类型和严重程度",
            tool_name: "浏览告警监控页面",
            status_text: "查看系统告警页面，筛选相关告警",
            time: "14:35",
            view: ViewId::Alerts,
        },
        StepMessage {
            title: "进行故障根因分析，确定最佳修复方案",
            tool_name: "故障分析工具",
            status_text: "执行诊断命令，分析日志文件",
            time: "14:38",
            view: ViewId::Analysis,
        },
        StepMessage {
            title: "生成并执行自动恢复策略，修复网络故障",
            tool_name: "Shell脚本执行工具",
            status_text: "执行恢复脚本：switch_to_backup_link.sh",
            time: "预计 14:45",
            view: ViewId::Recovery,
        },
        StepMessage {
            title: "验证修复效果，确认网络服务恢复正常",
            tool_name: "验证测试工具",
            status_text: "等待恢复完成后执行连通性测试",
            time: "预计 14:50",
            view: ViewId::Verification,
        },
    ]
}

/// Agent's opening message, acknowledging the submitted task.
pub fn intro_message(task: &str) -> String {
    format!(
        "我将协助您通过自动化故障响应系统解决「{task}」。我将分析当前网络拓扑，\
         审查活跃告警，执行全面故障诊断，并实施自动化恢复策略。"
    )
}

/// Agent message shown when the sequence suspends at the confirmation
/// gate.
pub const CONFIRMATION_MESSAGE: &str = "UI智能体 正在将路径于 /home/ubuntu/fault-recovery \
     的服务修复到公网网路上。请点击确认按钮完成恢复。";

/// Sub-line under the gate prompt.
pub const CONFIRMATION_HINT: &str = "等待用户确认以完成故障修复和网络恢复验证。";

/// Agent's wrap-up message once the walkthrough completes.
pub const FINAL_MESSAGE: &str = "确认后，系统已执行自动恢复策略，修复网络故障并恢复正常服务。\
     以下是详细的修复报告和验证结果。";

/// Greeting shown before any task has been submitted.
pub const WELCOME_MESSAGE: &str = "你好！我是 UI智能体，你的智能运维助手。\
     我可以帮助你处理各种系统故障和运维任务。\n\
     请告诉我你需要解决什么问题，我会为你制定详细的解决方案并执行相关操作。";

/// Lifecycle status of the timeline entry at `index` for a given
/// sequencer snapshot. Entries past the cursor are pending and not shown.
pub fn step_status(index: usize, snapshot: &SequencerSnapshot) -> StageStatus {
    let index = index as i32;
    if index < snapshot.step_index {
        StageStatus::Completed
    } else if index == snapshot.step_index && !snapshot.complete {
        StageStatus::InProgress
    } else if snapshot.complete {
        StageStatus::Completed
    } else {
        StageStatus::Pending
    }
}

//! Network topology map: three nodes plus a streaming status line.

use console::style;

/// Per-character reveal interval in milliseconds.
pub const REVEAL_MS: u64 = 50;

pub const STATUS_LINE: &str = "检测到交换机 B 出现故障，影响网络连通性";

/// Health of a topology node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Normal,
    Faulted,
    Warning,
}

impl NodeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            NodeStatus::Normal => "正常",
            NodeStatus::Faulted => "故障",
            NodeStatus::Warning => "警告",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyNode {
    pub name: &'static str,
    pub status: NodeStatus,
}

/// The scripted topology: router A healthy, switch B down, server C
/// degraded.
pub fn demo_nodes() -> Vec<TopologyNode> {
    vec![
        TopologyNode {
            name: "路由器 A",
            status: NodeStatus::Normal,
        },
        TopologyNode {
            name: "交换机 B",
            status: NodeStatus::Faulted,
        },
        TopologyNode {
            name: "服务器 C",
            status: NodeStatus::Warning,
        },
    ]
}

/// Render the node grid with status badges.
pub fn render_nodes() -> String {
    let mut out = String::new();
    for node in demo_nodes() {
        let badge = match node.status {
            NodeStatus::Normal => style(node.status.label()).green(),
            NodeStatus::Faulted => style(node.status.label()).red().bold(),
            NodeStatus::Warning => style(node.status.label()).yellow(),
        };
        out.push_str(&format!("  ◉ {}  [{}]\n", node.name, badge));
    }
    out
}

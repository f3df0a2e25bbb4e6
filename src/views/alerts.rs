//! Alert monitor: three fixture alerts of descending severity.

use console::style;

/// Severity of a monitoring alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

impl AlertSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            AlertSeverity::Critical => "严重告警",
            AlertSeverity::Warning => "警告",
            AlertSeverity::Info => "信息",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub summary: &'static str,
    /// Scripted display timestamp
    pub timestamp: &'static str,
}

pub fn demo_alerts() -> Vec<Alert> {
    vec![
        Alert {
            severity: AlertSeverity::Critical,
            summary: "交换机 B 连接中断",
            timestamp: "2024-01-15 14:30:25",
        },
        Alert {
            severity: AlertSeverity::Warning,
            summary: "服务器 C CPU 使用率过高",
            timestamp: "2024-01-15 14:28:10",
        },
        Alert {
            severity: AlertSeverity::Info,
            summary: "路由器 A 状态正常",
            timestamp: "2024-01-15 14:25:00",
        },
    ]
}

/// Render the alert cards.
pub fn render() -> String {
    let mut out = String::new();
    for alert in demo_alerts() {
        let label = match alert.severity {
            AlertSeverity::Critical => style(alert.severity.label()).red().bold(),
            AlertSeverity::Warning => style(alert.severity.label()).yellow(),
            AlertSeverity::Info => style(alert.severity.label()).blue(),
        };
        out.push_str(&format!(
            "  [{}] {}\n        {}\n",
            label,
            alert.summary,
            style(alert.timestamp).dim()
        ));
    }
    out
}

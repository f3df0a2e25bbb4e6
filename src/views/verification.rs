//! Post-recovery verification report: three passing checks plus a
//! summary.

use console::style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationCheck {
    pub name: &'static str,
    pub detail: &'static str,
}

pub fn demo_checks() -> Vec<VerificationCheck> {
    vec![
        VerificationCheck {
            name: "网络连通性测试",
            detail: "所有节点连接正常",
        },
        VerificationCheck {
            name: "服务可用性检查",
            detail: "所有服务运行正常",
        },
        VerificationCheck {
            name: "告警状态",
            detail: "所有严重告警已清除",
        },
    ]
}

pub const SUMMARY: &str = "故障已成功修复。通过启用备用链路，网络服务已恢复正常。\
     建议后续更换故障交换机以确保系统稳定性。";

/// Render the check cards and the repair summary.
pub fn render() -> String {
    let mut out = String::new();
    for check in demo_checks() {
        out.push_str(&format!(
            "  {} {}\n        {}\n",
            style("✓").green().bold(),
            check.name,
            style(check.detail).green()
        ));
    }
    out.push_str(&format!("\n  {}\n  {}\n", style("修复总结").bold(), SUMMARY));
    out
}

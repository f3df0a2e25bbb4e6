//! Recovery script execution transcript.

/// Per-character reveal interval in milliseconds.
pub const REVEAL_MS: u64 = 60;

/// Name of the scripted remediation shell script.
pub const RECOVERY_SCRIPT: &str = "switch_to_backup_link.sh";

pub const TRANSCRIPT: &str = "$ 执行自动恢复策略...
步骤 1: 生成恢复脚本
✓ 恢复脚本已生成

步骤 2: 执行恢复操作
正在执行: switch_to_backup_link.sh

#!/bin/bash
# 启用备用链路
ifconfig eth1 up
route add default gw 192.168.1.1 eth1
# 重新配置路由表
iptables -t nat -A POSTROUTING -o eth1 -j MASQUERADE

✓ 备用链路已启用
✓ 路由表已更新
正在验证连接...";

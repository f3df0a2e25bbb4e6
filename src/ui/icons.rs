//! Shared UI icons and emojis.
//!
//! This module provides common emoji constants used across the UI
//! components for consistent visual styling.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "[..]");
pub static ALERT: Emoji<'_, '_> = Emoji("🚨 ", "[!]");
pub static ROBOT: Emoji<'_, '_> = Emoji("🤖 ", "[AI]");

// Tool indicators
pub static TOOL: Emoji<'_, '_> = Emoji("🔧 ", ">");
pub static VIEW: Emoji<'_, '_> = Emoji("🖥️  ", "[V]");
pub static GATE: Emoji<'_, '_> = Emoji("🔒 ", "[?]");

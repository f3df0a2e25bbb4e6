//! Typed errors for the walkthrough player.
//!
//! The sequencing core itself never fails — invalid input is a silent
//! no-op and out-of-range cursors clamp (the presentation owns input
//! validation). The only hard errors in the system come from loading a
//! stage table or configuration the player cannot use.

use thiserror::Error;

/// A stage table the sequencer cannot play.
#[derive(Debug, Error)]
pub enum StageTableError {
    #[error("Stage table is empty")]
    Empty,

    #[error("Stage {index} ('{title}') has a zero delay")]
    ZeroDelay { index: usize, title: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_table_error_zero_delay_carries_context() {
        let err = StageTableError::ZeroDelay {
            index: 2,
            title: "打开告警".to_string(),
        };
        match &err {
            StageTableError::ZeroDelay { index, title } => {
                assert_eq!(*index, 2);
                assert_eq!(title, "打开告警");
            }
            _ => panic!("Expected ZeroDelay"),
        }
        assert!(err.to_string().contains("zero delay"));
    }

    #[test]
    fn stage_table_errors_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&StageTableError::Empty);
    }
}

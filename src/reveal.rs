//! Typewriter-style text reveal.
//!
//! Given static fixture text, `TextReveal` publishes a lazily-growing
//! prefix at a fixed per-character interval through a watch channel. The
//! fixture content is Chinese, so the prefix grows by characters, never by
//! bytes. The reveal looks endless in the viewer but terminates once the
//! full text is shown.
//!
//! The restart contract mirrors a `should_start` flag toggling false →
//! true: drop (or abort) the old handle and call `start()` again to replay
//! from the empty prefix.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// One frame of the reveal: the prefix shown so far.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealFrame {
    pub text: String,
    pub complete: bool,
}

/// A reusable reveal definition. `start()` may be called any number of
/// times; each call produces an independent replay.
#[derive(Clone)]
pub struct TextReveal {
    chars: Arc<Vec<char>>,
    char_interval: Duration,
}

impl TextReveal {
    pub fn new(text: &str, char_interval: Duration) -> Self {
        Self {
            chars: Arc::new(text.chars().collect()),
            char_interval,
        }
    }

    /// Convenience constructor matching the fixtures' "ms per character"
    /// reveal speeds.
    pub fn from_speed(text: &str, ms_per_char: u64) -> Self {
        Self::new(text, Duration::from_millis(ms_per_char))
    }

    /// Number of characters in the full text.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Begin revealing. Must be called from within a Tokio runtime.
    pub fn start(&self) -> RevealHandle {
        let initial = RevealFrame {
            text: String::new(),
            complete: self.chars.is_empty(),
        };
        let (tx, rx) = watch::channel(initial);
        let chars = self.chars.clone();
        let char_interval = self.char_interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(char_interval);
            // The first interval tick completes immediately; consume it so
            // the first character lands one interval after start
            ticker.tick().await;
            for end in 1..=chars.len() {
                ticker.tick().await;
                let frame = RevealFrame {
                    text: chars[..end].iter().collect(),
                    complete: end == chars.len(),
                };
                if tx.send(frame).is_err() {
                    return;
                }
            }
        });

        RevealHandle { rx, task }
    }
}

/// A single in-flight reveal. Dropping the handle aborts the reveal task.
pub struct RevealHandle {
    rx: watch::Receiver<RevealFrame>,
    task: JoinHandle<()>,
}

impl RevealHandle {
    /// Latest frame. Intermediate frames may be skipped if the consumer
    /// lags; the prefix only ever grows.
    pub fn snapshot(&self) -> RevealFrame {
        self.rx.borrow().clone()
    }

    pub fn is_complete(&self) -> bool {
        self.rx.borrow().complete
    }

    /// Wait for the next frame. Returns `false` once the reveal task has
    /// finished and no further frames will arrive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Stop revealing early.
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for RevealHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

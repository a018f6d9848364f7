//! services/player/src/engine/controls_timer.rs
//!
//! The single-shot countdown that hides transport controls after inactivity.
//!
//! At most one countdown is pending. Arming cancels the previous one through
//! its `CancellationToken`, and every expiry carries the generation it was
//! armed as so a message that raced a re-arm can be told apart.

use crate::engine::state::EngineInput;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug)]
pub struct ControlsTimer {
    delay: Duration,
    tx: UnboundedSender<EngineInput>,
    generation: u64,
    pending: Option<CancellationToken>,
}

impl ControlsTimer {
    pub fn new(delay: Duration, tx: UnboundedSender<EngineInput>) -> Self {
        Self {
            delay,
            tx,
            generation: 0,
            pending: None,
        }
    }

    /// (Re)starts the countdown. Returns the generation of the new countdown.
    pub fn arm(&mut self) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let token = CancellationToken::new();
        let child = token.clone();
        let tx = self.tx.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = child.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if tx.send(EngineInput::ControlsTimeout { generation }).is_err() {
                        debug!("Session queue closed before controls timeout {}.", generation);
                    }
                }
            }
        });

        self.pending = Some(token);
        generation
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Accepts a timeout message. Returns true only for the live countdown.
    pub fn expire(&mut self, generation: u64) -> bool {
        if self.pending.is_some() && generation == self.generation {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Drop for ControlsTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const DELAY: Duration = Duration::from_secs(3);

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_the_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = ControlsTimer::new(DELAY, tx);

        let generation = timer.arm();
        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.try_recv().ok(), Some(EngineInput::ControlsTimeout { generation }));
        assert!(timer.expire(generation));
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_cancels_the_pending_countdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = ControlsTimer::new(DELAY, tx);

        let first = timer.arm();
        tokio::time::sleep(Duration::from_secs(2)).await;
        let second = timer.arm();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(
            rx.try_recv().ok(),
            Some(EngineInput::ControlsTimeout { generation: second })
        );
        assert!(rx.try_recv().is_err());
        assert!(!timer.expire(first));
        assert!(timer.expire(second));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_expiry() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = ControlsTimer::new(DELAY, tx);
        timer.arm();
        timer.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}

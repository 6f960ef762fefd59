// src/typewriter.rs

use crate::session::Transition;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Presentation pacer for the typewriter reveal. Character publishes are
/// released one per interval; anything else in the queue (stream end,
/// stream failure) waits its turn and then releases immediately, so the
/// reducer sees transitions in exactly the order the wire produced them.
#[derive(Debug)]
pub struct Typewriter {
    pending: VecDeque<Transition>,
    interval: Duration,
    last_release: Instant,
}

impl Typewriter {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            pending: VecDeque::new(),
            interval: Duration::from_millis(interval_ms),
            last_release: Instant::now(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn enqueue(&mut self, transition: Transition, now: Instant) {
        // A fresh burst starts its cadence from now, not from whenever the
        // previous stream finished.
        if self.pending.is_empty() {
            self.last_release = now;
        }
        self.pending.push_back(transition);
    }

    /// Returns every transition whose time has come. Ticks may lag the
    /// cadence; the release clock advances by whole intervals so a slow
    /// tick catches up instead of stretching the animation.
    pub fn release(&mut self, now: Instant) -> Vec<Transition> {
        let mut due = Vec::new();
        loop {
            let ready = match self.pending.front() {
                None => break,
                Some(Transition::ChunkReceived { .. }) => {
                    now.duration_since(self.last_release) >= self.interval
                }
                Some(_) => true,
            };
            if !ready {
                break;
            }
            if let Some(transition) = self.pending.pop_front() {
                if matches!(transition, Transition::ChunkReceived { .. }) {
                    self.last_release += self.interval;
                }
                due.push(transition);
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Transition {
        Transition::ChunkReceived {
            text: text.to_string(),
        }
    }

    #[test]
    fn characters_release_one_per_interval() {
        let mut tw = Typewriter::new(50);
        let t0 = Instant::now();
        for c in ["a", "b", "c"] {
            tw.enqueue(chunk(c), t0);
        }

        assert!(tw.release(t0).is_empty());
        assert_eq!(tw.release(t0 + Duration::from_millis(50)), vec![chunk("a")]);
        assert!(tw
            .release(t0 + Duration::from_millis(70))
            .is_empty());
        // A late tick catches up on the missed beats.
        assert_eq!(
            tw.release(t0 + Duration::from_millis(160)),
            vec![chunk("b"), chunk("c")]
        );
        assert!(tw.is_idle());
    }

    #[test]
    fn terminal_transition_waits_behind_characters() {
        let mut tw = Typewriter::new(50);
        let t0 = Instant::now();
        tw.enqueue(chunk("x"), t0);
        tw.enqueue(Transition::StreamEnded, t0);

        assert!(tw.release(t0).is_empty());
        assert_eq!(
            tw.release(t0 + Duration::from_millis(50)),
            vec![chunk("x"), Transition::StreamEnded]
        );
    }

    #[test]
    fn terminal_transition_alone_releases_at_once() {
        let mut tw = Typewriter::new(50);
        let t0 = Instant::now();
        tw.enqueue(Transition::StreamFailed, t0);

        assert_eq!(tw.release(t0), vec![Transition::StreamFailed]);
        assert!(tw.is_idle());
    }

    #[test]
    fn cadence_restarts_for_a_new_burst() {
        let mut tw = Typewriter::new(50);
        let t0 = Instant::now();
        tw.enqueue(chunk("a"), t0);
        tw.release(t0 + Duration::from_millis(50));
        assert!(tw.is_idle());

        // Enqueue long after the previous burst drained; the first release
        // still waits a full interval rather than flooding out.
        let t1 = t0 + Duration::from_secs(10);
        tw.enqueue(chunk("b"), t1);
        assert!(tw.release(t1).is_empty());
        assert_eq!(tw.release(t1 + Duration::from_millis(50)), vec![chunk("b")]);
    }
}

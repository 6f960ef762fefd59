// src/app.rs

use crate::client::{self, PredictClient};
use crate::config::Config;
use crate::log_view::LogView;
use crate::reassemble::{Reassembler, RevealPolicy};
use crate::session::{Session, Transition};
use crate::status_indicator::StatusIndicator;
use crate::typewriter::Typewriter;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Everything the terminal UI owns: the session it renders, the pacer,
/// the side panes, and the channel its workers report back on.
pub struct App {
    pub session: Session,
    pub typewriter: Typewriter,
    pub status_indicator: StatusIndicator,
    pub logs: LogView,
    pub chat_scroll: u16,
    pub follow: bool,
    pub should_quit: bool,
    client: PredictClient,
    policy: RevealPolicy,
    transition_tx: mpsc::Sender<Transition>,
}

impl App {
    pub fn new(config: &Config, transition_tx: mpsc::Sender<Transition>) -> Self {
        let client = PredictClient::new(
            config.endpoint.clone(),
            Duration::from_secs(config.connect_timeout_secs),
        );
        Self {
            session: Session::new(config.reveal_policy),
            typewriter: Typewriter::new(config.typewriter_interval_ms),
            status_indicator: StatusIndicator::new(),
            logs: LogView::new(),
            chat_scroll: 0,
            follow: true,
            should_quit: false,
            client,
            policy: config.reveal_policy,
            transition_tx,
        }
    }

    /// Sends the draft, unless it is blank or a reply is already in flight.
    pub fn submit(&mut self) {
        let Some((question, history)) = self.session.begin_exchange() else {
            return;
        };
        self.logs.add(format!("asking: {}", question.trim()));
        self.status_indicator.clear_status();
        self.follow = true;
        self.sync_indicator();

        let client = self.client.clone();
        let reassembler = Reassembler::new(self.policy);
        let tx = self.transition_tx.clone();
        tokio::spawn(async move {
            client::run_exchange(client, question, history, reassembler, tx).await;
        });
    }

    /// Feeds one worker transition into the session. Under the typewriter
    /// policy it goes through the pacer instead of applying at once.
    pub fn on_transition(&mut self, transition: Transition) {
        if self.policy == RevealPolicy::Typewriter {
            let now = Instant::now();
            self.typewriter.enqueue(transition, now);
            for released in self.typewriter.release(now) {
                self.apply(released);
            }
        } else {
            self.apply(transition);
        }
    }

    /// Advances the pacer once per UI tick. The spinner advances in the
    /// draw pass instead, where every frame sees it.
    pub fn on_tick(&mut self) {
        for released in self.typewriter.release(Instant::now()) {
            self.apply(released);
        }
    }

    fn apply(&mut self, transition: Transition) {
        match &transition {
            Transition::StreamEnded => self.logs.add("response complete".to_string()),
            Transition::StreamFailed => {
                self.logs.add("request failed; see the log file".to_string());
                // Stays on the status row until the next submission.
                self.status_indicator.set_status("request failed");
            }
            _ => {}
        }
        self.session.apply(transition);
        self.sync_indicator();
    }

    fn sync_indicator(&mut self) {
        self.status_indicator
            .set_thinking(self.session.is_thinking());
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn jump_to_latest(&mut self) {
        self.follow = true;
        self.logs.scroll_offset = 0;
    }
}

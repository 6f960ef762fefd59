// src/session.rs

use crate::constants::ERROR_REPLY;
use crate::reassemble::RevealPolicy;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Who produced a message. Serializes to the wire names used in the
/// request history: `"user"` / `"bot"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One entry in the conversation. The timestamp is presentation metadata
/// and never leaves the process.
#[derive(Debug, Clone)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn user(text: String) -> Self {
        Self {
            sender: Sender::User,
            text,
            timestamp: Local::now(),
        }
    }

    pub fn bot(text: String) -> Self {
        Self {
            sender: Sender::Bot,
            text,
            timestamp: Local::now(),
        }
    }
}

/// Where the session stands with respect to the one permitted in-flight
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Waiting,
    Streaming,
}

/// The full set of state-machine inputs. Everything that mutates the
/// conversation goes through one of these, so the whole exchange can be
/// replayed or logged from its serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    SubmitStarted { question: String },
    ChunkReceived { text: String },
    StreamEnded,
    StreamFailed,
}

/// Conversation state plus the draft being typed. Mutated exclusively by
/// [`Session::apply`] (and draft edits); rendering reads it and never
/// writes.
#[derive(Debug)]
pub struct Session {
    pub draft: String,
    messages: Vec<Message>,
    phase: Phase,
    policy: RevealPolicy,
}

impl Session {
    pub fn new(policy: RevealPolicy) -> Self {
        Self {
            draft: String::new(),
            messages: Vec::new(),
            phase: Phase::Idle,
            policy,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a request is outstanding. Guards submission for every
    /// policy, including the one that hides the thinking display early.
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Whether the thinking indicator should show. Under the immediate
    /// policy the display ends at the first received character; the other
    /// policies keep it up until the stream settles.
    pub fn is_thinking(&self) -> bool {
        match self.policy {
            RevealPolicy::Immediate => self.phase == Phase::Waiting,
            _ => self.phase != Phase::Idle,
        }
    }

    /// The `(sender, text)` pairs sent verbatim as request history.
    pub fn history_pairs(&self) -> Vec<(Sender, String)> {
        self.messages
            .iter()
            .map(|m| (m.sender, m.text.clone()))
            .collect()
    }

    /// Guarded submission. Returns the question and the history captured
    /// *before* the user message is appended (the history sent with a
    /// request never contains the question it carries), or `None` when the
    /// draft is blank or a request is already in flight.
    pub fn begin_exchange(&mut self) -> Option<(String, Vec<(Sender, String)>)> {
        if self.draft.trim().is_empty() {
            return None;
        }
        if self.is_busy() {
            log::debug!("submit rejected: request already in flight");
            return None;
        }
        let question = self.draft.clone();
        let history = self.history_pairs();
        self.apply(Transition::SubmitStarted {
            question: question.clone(),
        });
        Some((question, history))
    }

    /// The pure reducer. Transitions that are impossible in the current
    /// phase are dropped, which keeps a settled exchange immutable until
    /// the next submission starts.
    pub fn apply(&mut self, transition: Transition) {
        if log::log_enabled!(log::Level::Debug) {
            if let Ok(json) = serde_json::to_string(&transition) {
                log::debug!("transition {}", json);
            }
        }

        match transition {
            Transition::SubmitStarted { question } => {
                if self.phase != Phase::Idle {
                    log::debug!("dropping submit while a request is in flight");
                    return;
                }
                self.messages.push(Message::user(question));
                self.draft.clear();
                self.phase = Phase::Waiting;
            }
            Transition::ChunkReceived { text } => match self.phase {
                Phase::Idle => log::debug!("dropping chunk outside an exchange"),
                Phase::Waiting => {
                    // First output of the exchange: the reply message is
                    // created here and grows in place from now on.
                    self.messages.push(Message::bot(String::new()));
                    self.phase = Phase::Streaming;
                    self.append_to_reply(&text);
                }
                Phase::Streaming => self.append_to_reply(&text),
            },
            Transition::StreamEnded => match self.phase {
                Phase::Idle => log::debug!("dropping stream end outside an exchange"),
                Phase::Waiting => {
                    // The stream closed without a single byte; the reply
                    // still materializes so the exchange has a bot message.
                    self.messages.push(Message::bot(String::new()));
                    self.phase = Phase::Idle;
                }
                Phase::Streaming => self.phase = Phase::Idle,
            },
            Transition::StreamFailed => {
                if self.phase == Phase::Idle {
                    log::debug!("dropping stream failure outside an exchange");
                    return;
                }
                // Whatever was already revealed stays; the fixed error text
                // is appended as its own message.
                self.messages.push(Message::bot(ERROR_REPLY.to_string()));
                self.phase = Phase::Idle;
            }
        }
    }

    fn append_to_reply(&mut self, text: &str) {
        if let Some(last) = self.messages.last_mut() {
            last.text.push_str(text);
        }
    }
}

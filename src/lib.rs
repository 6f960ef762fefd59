// src/lib.rs

pub mod app;
pub mod chat_view;
pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod key_handlers;
pub mod log_view;
pub mod logging;
pub mod reassemble;
pub mod session;
pub mod status_indicator;
pub mod typewriter;
pub mod utils;

pub use app::App;
pub use session::{Message, Sender, Session, Transition};

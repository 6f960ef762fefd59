// Endpoint Constants
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/predict/";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

// Reveal Constants
pub const DEFAULT_TYPEWRITER_INTERVAL_MS: u64 = 50;

// The one user-visible failure text; every error path collapses to it.
pub const ERROR_REPLY: &str = "Sorry, an error occurred. Please try again.";

// UI Constants
pub const LOG_BACKLOG: usize = 200;

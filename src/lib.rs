// Library surface: the session/statistics engine plus the ports it talks
// through. The terminal front end in main.rs is one consumer of it.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod practice_text;
pub mod provider;
pub mod remote;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod theme;
pub mod time_series;
pub mod util;

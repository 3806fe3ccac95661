//! # SiteTester client - command-line audits against a SiteTesterPro backend
//!
//! Native runtime for [`sitetester_core`]: reqwest for HTTP, tokio for
//! timers and Ctrl-C, the terminal for progress and results.
//!
//! ```text
//! sitetester h1 --file urls.txt --name "Homepage audit"
//!   📤 Uploading file and preparing...
//!   [##########--------------------]  33%  Audited 1 of 3 pages...
//!   ✅ Completed!
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Base URL and cookie resolution
//! - [`http`] - [`sitetester_core::AuditApi`] over reqwest
//! - [`runtime`] - Tokio sleeper and interrupt handling
//! - [`audit`] - Follow a session and load its results
//! - [`terminal`] - Progress sink, notices and result tables
//! - [`export`] - CSV export
//! - [`error`] - CLI errors and exit codes

pub mod audit;
pub mod config;
pub mod error;
pub mod export;
pub mod http;
pub mod runtime;
pub mod terminal;

pub use audit::{follow, SessionReport};
pub use config::{ClientConfig, ConfigError};
pub use error::{CliError, CliResult};
pub use http::HttpApi;
pub use runtime::TokioSleeper;
pub use terminal::{TerminalNotifier, TerminalSink};

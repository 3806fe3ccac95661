//! Browser implementations of the core seams.
//!
//! # Services
//!
//! - [`api`] - [`sitetester_core::AuditApi`] over gloo-net
//! - [`cookies`] - Bearer token from `document.cookie`
//! - [`timer`] - [`sitetester_core::Sleeper`] over gloo-timers
//! - [`navigation`] - Redirects, confirmation prompts, notices

pub mod api;
pub mod cookies;
pub mod navigation;
pub mod timer;

pub use api::*;
pub use cookies::*;
pub use navigation::*;
pub use timer::*;

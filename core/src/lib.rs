//! # SiteTester core - audit session polling and result projections
//!
//! Runtime-agnostic domain of the SiteTesterPro clients. An audit uploads
//! a URL list, polls the backend until the session ends, then renders the
//! results. Five audit types share that cycle; their differences live in
//! [`AuditProfile`] as data.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Selection  │────▶│   Upload    │────▶│   Poller    │────▶│   Render    │
//! │ (validate)  │     │ (AuditApi)  │     │ (PollState) │     │ (ResultSet) │
//! └─────────────┘     └─────────────┘     └──────▲──────┘     └─────────────┘
//!                                                │ stop
//!                                         ┌──────┴──────┐
//!                                         │ StopControl │
//!                                         └─────────────┘
//! ```
//!
//! No HTTP client or timer lives here: callers provide them through the
//! [`AuditApi`] and [`Sleeper`] traits.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sitetester_core::{AuditKind, SelectionState, SessionView};
//!
//! let view = SessionView::submit(&api, AuditKind::H1.profile(), selection, token.as_ref()).await?;
//! let outcome = view.poller(token.as_ref()).run(&api, &sleeper, &mut sink, cancelled).await;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Validation, transport and submission errors
//! - [`profile`] - Per-audit-type configuration
//! - [`model`] - Wire models
//! - [`flex`] - Tolerant list parsing
//! - [`credentials`] - Bearer token from cookies
//! - [`selection`] - Form state and upload validation
//! - [`api`] - Transport seams
//! - [`poller`] - Poll state machine and driver
//! - [`session`] - Session view and stop control
//! - [`render`] - Result projections and media keys
//! - [`notice`] - Dialogs and navigation
//! - [`activity`] - Capped activity log

// Core modules
pub mod error;
pub mod model;
pub mod notice;
pub mod profile;

// Boundary parsing
pub mod flex;

// Inputs
pub mod credentials;
pub mod selection;

// Session lifecycle
pub mod api;
pub mod poller;
pub mod session;

// Output
pub mod activity;
pub mod render;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ApiError, ApiResult, SubmitError, SubmitResult, ValidationError};

// =============================================================================
// Re-exports - Profiles and models
// =============================================================================

pub use model::{
    percent, H1Result, MediaRecord, PerformanceReport, PerformanceResult, PhoneNumber,
    PhoneResult, ProgressRecord, ProgressSnapshot, SessionConfig, SessionId, SessionStatus,
    UploadReceipt,
};
pub use profile::{AuditKind, AuditProfile, ResultShape, TotalFallback};

// =============================================================================
// Re-exports - Inputs
// =============================================================================

pub use credentials::{BearerToken, CookieStore, CredentialAccessor};
pub use selection::{FilePart, SelectionState, UploadRequest, UrlSource};

// =============================================================================
// Re-exports - Session lifecycle
// =============================================================================

pub use api::{AuditApi, Sleeper, Tick};
pub use poller::{PollEvent, PollOutcome, PollState, PollStep, Poller, ProgressSink, ProgressView};
pub use session::{Conclusion, Phase, SessionView, StopControl, StopOutcome};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use activity::{ActivityLog, LogEntry, LogLevel};
pub use notice::{Navigation, Notice, Notifier, Severity};
pub use render::{media_key, ResultSet};

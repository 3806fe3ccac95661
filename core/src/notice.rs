//! User-facing notifications and navigation directives.
//!
//! The modal dialog library and the browser location are external
//! collaborators: the core only decides *what* to say and *where* to go,
//! the runtime decides how to show it.

use std::fmt;

/// Severity of a dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// CSS class used by the web modal.
    pub fn css_class(&self) -> &'static str {
        match self {
            Severity::Info => "notice-info",
            Severity::Success => "notice-success",
            Severity::Warning => "notice-warning",
            Severity::Error => "notice-error",
        }
    }

    /// Emoji prefix for terminal output.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ️",
            Severity::Success => "✅",
            Severity::Warning => "⚠️",
            Severity::Error => "❌",
        }
    }
}

/// A modal message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub text: String,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            text: text.into(),
        }
    }

    pub fn info(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Severity::Info, title, text)
    }

    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Severity::Success, title, text)
    }

    pub fn warning(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, text)
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, text)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity.emoji(), self.title, self.text)
    }
}

/// Where the page must go next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// Authentication is missing or expired.
    Login,
    /// A stopped session sends the user back to their session list.
    Profile,
}

impl Navigation {
    /// Server route for this destination.
    pub fn path(&self) -> &'static str {
        match self {
            Navigation::Login => "/login",
            Navigation::Profile => "/profile",
        }
    }
}

/// Presents notices to the user.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

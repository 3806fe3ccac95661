//! Application configuration.
//!
//! The audit pages are served by the backend itself, so every request goes
//! to the same origin. Routes of the login and session pages come from
//! [`sitetester_core::Navigation::path`].

/// Backend base URL, prefixed to every API path.
///
/// Empty: requests are same-origin and carry the browser's cookies.
pub const BACKEND_URL: &str = "";

/// Application name shown in the header.
pub const APP_NAME: &str = "SiteTesterPro";

/// Browsers offered by the static and dynamic audits.
pub const BROWSERS: &[&str] = &["Chrome", "Edge", "Firefox", "Safari"];

/// Resolutions offered by the static and dynamic audits.
pub const RESOLUTIONS: &[&str] = &[
    "1920x1080",
    "1366x768",
    "1280x720",
    "1024x768",
    "768x1024",
    "480x800",
];

/// Phone scan options as (value, label).
///
/// Values are passed through to the backend untouched.
pub const PHONE_OPTIONS: &[(&str, &str)] = &[
    ("check_format", "Check number formatting"),
    ("check_links", "Check click-to-call links"),
    ("international", "Detect international numbers"),
];

/// Absolute-or-same-origin URL of a backend path.
pub fn backend_url(path: &str) -> String {
    format!("{}{}", BACKEND_URL, path)
}

//! SiteTester Web - Leptos front-end for SiteTesterPro audits
//!
//! A WebAssembly front-end that uploads URL lists, follows the audit
//! session and renders its results. Audit logic lives in
//! [`sitetester_core`]; this crate supplies the browser transport, timer
//! and cookies, and the views.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Header (audit links, account)                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  /                 Home                                      │
//! │  /audit/:kind      AuditPage                                 │
//! │                    ├── Hero                                  │
//! │                    ├── UploadForm      (Uploading)           │
//! │                    ├── ProgressPanel   (Polling, Finished)   │
//! │                    ├── results view    (Results)             │
//! │                    ├── ActivityPanel                         │
//! │                    └── NoticeModal                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Footer                                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`] - Backend URL and form choices
//! - [`types`] - Page-level types (notices, results state, resume links)
//! - [`components`] - UI components
//! - [`services`] - gloo-net transport, cookies, timer, navigation

use leptos::*;
use leptos_meta::*;
use leptos_router::*;
use sitetester_core::AuditKind;

// =============================================================================
// Module declarations
// =============================================================================

pub mod components;
pub mod config;
pub mod services;
pub mod types;

// =============================================================================
// Re-exports
// =============================================================================

pub use components::*;
pub use config::*;
pub use types::{PendingNotice, ResultsState, ResumeParams};

// =============================================================================
// Application Entry Point
// =============================================================================

/// Install logging and the panic hook, then mount [`App`].
pub fn mount() {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Debug);

    log::info!("🦀 SiteTester - Starting Leptos App");

    mount_to_body(|| view! { <App/> });
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text=APP_NAME/>
        <Router>
            <Header/>
            <main>
                <Routes>
                    <Route path="/" view=Home/>
                    <Route path="/audit/:kind" view=AuditRoute/>
                    <Route path="/*any" view=NotFound/>
                </Routes>
            </main>
            <Footer/>
        </Router>
    }
}

/// Resolves `:kind` to its audit page.
#[component]
fn AuditRoute() -> impl IntoView {
    let params = use_params_map();
    let kind = create_memo(move |_| {
        params.with(|p| p.get("kind").and_then(|slug| slug.parse::<AuditKind>().ok()))
    });

    move || match kind.get() {
        Some(kind) => view! { <AuditPage kind=kind/> }.into_view(),
        None => view! { <NotFound/> }.into_view(),
    }
}

use leptos::*;
use leptos_router::A;
use sitetester_core::AuditKind;

use crate::components::{audit_subtitle, Hero};
use crate::config::APP_NAME;

/// Landing page listing the audits.
#[component]
pub fn Home() -> impl IntoView {
    view! {
        <div class="container">
            <Hero title=APP_NAME subtitle="Upload a list of URLs and run an audit across every page."/>
            <div class="audit-cards">
                {AuditKind::ALL
                    .iter()
                    .map(|kind| {
                        view! {
                            <A href=format!("/audit/{}", kind.slug()) class="audit-card">
                                <h2>{kind.profile().title}</h2>
                                <p>{audit_subtitle(*kind)}</p>
                            </A>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}

/// Shown for unknown routes and audit types.
#[component]
pub fn NotFound() -> impl IntoView {
    view! {
        <div class="container">
            <Hero title="Page not found" subtitle="Pick an audit from the navigation bar."/>
        </div>
    }
}

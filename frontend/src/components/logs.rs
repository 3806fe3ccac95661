//! Activity panel for the current session.
//!
//! Shows the page's [`ActivityLog`] (upload steps, failed progress
//! checks, terminal states) with auto-scroll to the newest entry.

use leptos::*;
use sitetester_core::ActivityLog;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Request animation frame helper for smooth scrolling
fn request_animation_frame(f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(f);
    if window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .is_ok()
    {
        closure.forget();
    }
}

#[component]
pub fn ActivityPanel(
    /// Log of the page
    log: RwSignal<ActivityLog>,
) -> impl IntoView {
    // Reference to the logs content div for auto-scroll
    let logs_container = create_node_ref::<leptos::html::Div>();

    create_effect(move |_| {
        log.with(|_| ());

        if let Some(container) = logs_container.get() {
            request_animation_frame(move || {
                container.set_scroll_top(container.scroll_height());
            });
        }
    });

    view! {
        <div class="logs-panel">
            <div class="logs-header">
                <span class="logs-title">"📋 Activity"</span>
                <button class="logs-clear" on:click=move |_| log.update(ActivityLog::clear)>
                    "Clear"
                </button>
            </div>
            <div class="logs-content" node_ref=logs_container>
                {move || {
                    log.with(|log| {
                        log.entries()
                            .map(|entry| {
                                view! {
                                    <div class=format!("log-entry {}", entry.level.css_class())>
                                        <span class="log-time">"[" {entry.timestamp.clone()} "] "</span>
                                        {entry.level.emoji()} " " {entry.message.clone()}
                                    </div>
                                }
                            })
                            .collect_view()
                    })
                }}
            </div>
        </div>
    }
}

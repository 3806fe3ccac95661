//! Footer component

use leptos::*;
use sitetester_core::Navigation;

use crate::config::APP_NAME;

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer>
            <div>{APP_NAME} " • Powered by " <span class="rust-badge">"🦀 Rust + Leptos"</span></div>
            <div class="footer-links">
                <a href=Navigation::Profile.path() class="footer-link">"Sessions"</a>
                <a href=Navigation::Login.path() class="footer-link">"Account"</a>
            </div>
        </footer>
    }
}

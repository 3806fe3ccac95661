//! Navigation bar: one link per audit, plus the account link.

use leptos::*;
use leptos_router::A;
use sitetester_core::{AuditKind, Navigation};

use crate::config::APP_NAME;
use crate::services::bearer_token;

#[component]
pub fn Header() -> impl IntoView {
    let logged_in = bearer_token().is_some();

    let account = if logged_in {
        view! { <a href=Navigation::Profile.path() class="account-link">"My Sessions"</a> }
    } else {
        view! { <a href=Navigation::Login.path() class="account-link">"Log in"</a> }
    };

    view! {
        <header>
            <div class="header-left">
                <A href="/" class="logo">{APP_NAME}</A>
            </div>
            <nav class="header-nav">
                {AuditKind::ALL
                    .iter()
                    .map(|kind| {
                        view! {
                            <A href=format!("/audit/{}", kind.slug()) class="nav-link">
                                {kind.profile().title}
                            </A>
                        }
                    })
                    .collect_view()}
            </nav>
            <div class="header-right">{account}</div>
        </header>
    }
}

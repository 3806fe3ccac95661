//! Hero section component

use leptos::*;

#[component]
pub fn Hero(
    /// Page title
    #[prop(into)]
    title: String,
    /// One-line description under the title
    #[prop(into)]
    subtitle: String,
) -> impl IntoView {
    view! {
        <div class="hero">
            <h1>{title}</h1>
            <p class="subtitle">{subtitle}</p>
        </div>
    }
}

use leptos::*;
use sitetester_core::ProgressView;

/// Progress bar, status line and the stop control.
#[component]
pub fn ProgressPanel(
    #[prop(into)]
    progress: Signal<Option<ProgressView>>,
    /// Status line under the bar
    #[prop(into)]
    status: Signal<String>,
    /// Whether the stop button is shown
    #[prop(into)]
    can_stop: Signal<bool>,
    #[prop(into)]
    stop_label: Signal<&'static str>,
    #[prop(into)]
    stop_enabled: Signal<bool>,
    on_stop: Callback<()>,
) -> impl IntoView {
    let percent = move || progress.with(|p| p.as_ref().map(|p| p.percent).unwrap_or(0));

    view! {
        <div class="progress-section show">
            <div class="progress-bar">
                <div class="progress-fill" style=move || format!("width: {}%;", percent())></div>
            </div>
            <div class="progress-meta">
                <span class="progress-percent">{move || format!("{}%", percent())}</span>
                <span class="status-text">{move || status.get()}</span>
            </div>
            <Show when=move || can_stop.get() fallback=|| view! {}>
                <button
                    class="stop-button"
                    prop:disabled=move || !stop_enabled.get()
                    on:click=move |_| on_stop.call(())
                >
                    {move || stop_label.get()}
                </button>
            </Show>
        </div>
    }
}

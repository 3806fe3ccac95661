use leptos::*;

use crate::services::navigate;
use crate::types::PendingNotice;

/// Modal dialog for the page's notices.
///
/// Closing it follows the notice's navigation, if any.
#[component]
pub fn NoticeModal(
    notice: ReadSignal<Option<PendingNotice>>,
    set_notice: WriteSignal<Option<PendingNotice>>,
) -> impl IntoView {
    let dismiss = move |_| {
        let then = notice.with_untracked(|pending| pending.as_ref().and_then(|p| p.then));
        set_notice.set(None);
        if let Some(navigation) = then {
            navigate(navigation);
        }
    };

    view! {
        <Show when=move || notice.with(Option::is_some) fallback=|| view! {}>
            {move || {
                notice
                    .get()
                    .map(|pending| {
                        let severity = pending.notice.severity;
                        view! {
                            <div class="modal-backdrop">
                                <div class=format!("modal {}", severity.css_class())>
                                    <div class="modal-icon">{severity.emoji()}</div>
                                    <h2 class="modal-title">{pending.notice.title}</h2>
                                    <p class="modal-text">{pending.notice.text}</p>
                                    <button class="modal-button" on:click=dismiss>"OK"</button>
                                </div>
                            </div>
                        }
                    })
            }}
        </Show>
    }
}

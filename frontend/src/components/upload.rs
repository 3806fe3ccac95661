//! Audit form: URL source, browser/resolution pickers and session fields.
//!
//! Which controls appear is decided by the [`AuditProfile`]. The form only
//! collects a [`SelectionState`]; validation and upload belong to the page.

use leptos::ev::SubmitEvent;
use leptos::*;
use js_sys::Uint8Array;
use sitetester_core::{AuditProfile, SelectionState, UrlSource};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, File, HtmlInputElement};

use crate::config::{BROWSERS, PHONE_OPTIONS, RESOLUTIONS};

/// Read a selected file into an upload source.
async fn read_file(file: &File) -> Result<UrlSource, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("Failed to read {}: {:?}", file.name(), e))?;

    Ok(UrlSource::File {
        name: file.name(),
        bytes: Uint8Array::new(&buffer).to_vec(),
    })
}

fn toggle(list: RwSignal<Vec<String>>, value: &str, checked: bool) {
    list.update(|items| {
        items.retain(|item| item != value);
        if checked {
            items.push(value.to_string());
        }
    });
}

/// A row of checkboxes bound to `selected`.
#[component]
fn CheckboxGroup(
    legend: &'static str,
    name: &'static str,
    /// (value, label) pairs
    choices: Vec<(String, String)>,
    selected: RwSignal<Vec<String>>,
) -> impl IntoView {
    view! {
        <fieldset class="checkbox-group">
            <legend>{legend}</legend>
            {choices
                .into_iter()
                .map(|(value, label)| {
                    let checked_value = value.clone();
                    let toggled_value = value.clone();
                    view! {
                        <label class="checkbox">
                            <input
                                type="checkbox"
                                name=name
                                value=value
                                prop:checked=move || selected.with(|s| s.contains(&checked_value))
                                on:change=move |ev| toggle(selected, &toggled_value, event_target_checked(&ev))
                            />
                            {label}
                        </label>
                    }
                })
                .collect_view()}
        </fieldset>
    }
}

#[component]
pub fn UploadForm(
    profile: AuditProfile,
    /// Called with the collected selection
    on_submit: Callback<SelectionState>,
) -> impl IntoView {
    let file = create_rw_signal(None::<File>);
    let manual_text = create_rw_signal(String::new());
    let browsers = create_rw_signal(Vec::<String>::new());
    let resolutions = create_rw_signal(Vec::<String>::new());
    let options = create_rw_signal(Vec::<String>::new());
    let session_name = create_rw_signal(String::new());
    let target_number = create_rw_signal(String::new());
    let (error, set_error) = create_signal(None::<String>);

    let on_file_change = move |ev: Event| {
        let input: HtmlInputElement = event_target(&ev);
        let selected = input.files().and_then(|files| files.get(0));
        set_error.set(None);
        file.set(selected);
    };

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let chosen = file.get_untracked();
        let mut selection = SelectionState {
            file: None,
            manual_text: manual_text.get_untracked(),
            browsers: browsers.get_untracked(),
            resolutions: resolutions.get_untracked(),
            options: options.get_untracked(),
            session_name: session_name.get_untracked(),
            target_number: target_number.get_untracked(),
        };

        spawn_local(async move {
            if let Some(chosen) = chosen {
                match read_file(&chosen).await {
                    Ok(source) => selection.file = Some(source),
                    Err(e) => {
                        log::error!("❌ {}", e);
                        set_error.set(Some(e));
                        return;
                    }
                }
            }
            on_submit.call(selection);
        });
    };

    let browser_choices: Vec<(String, String)> = BROWSERS
        .iter()
        .filter(|b| profile.browser_filter.map_or(true, |allowed| allowed.contains(*b)))
        .map(|b| (b.to_string(), b.to_string()))
        .collect();
    let resolution_choices: Vec<(String, String)> = RESOLUTIONS
        .iter()
        .map(|r| (r.to_string(), sitetester_core::render::media::resolution_label(r)))
        .collect();
    let option_choices: Vec<(String, String)> = PHONE_OPTIONS
        .iter()
        .map(|(value, label)| (value.to_string(), label.to_string()))
        .collect();

    let accepts_manual_urls = profile.accepts_manual_urls;
    let requires_browsers = profile.requires_browsers;
    let requires_resolutions = profile.requires_resolutions;
    let requires_target_number = profile.requires_target_number;
    let requires_session_name = profile.requires_session_name;
    let manual_placeholder = "https://example.com\nhttps://example.com/contact";

    view! {
        <form class="upload-section" on:submit=submit>
            <div class="upload-icon">"📤"</div>

            <label class="field">
                <span class="field-label">"URL list (one URL per line)"</span>
                <input type="file" accept=".txt" on:change=on_file_change/>
                <span class="upload-hint">
                    {move || file.with(|f| f.as_ref().map(|f| f.name())).unwrap_or_default()}
                </span>
            </label>

            <Show when=move || accepts_manual_urls fallback=|| view! {}>
                <label class="field">
                    <span class="field-label">"Or enter URLs"</span>
                    <textarea
                        rows="5"
                        placeholder=manual_placeholder
                        prop:value=move || manual_text.get()
                        on:input=move |ev| manual_text.set(event_target_value(&ev))
                    ></textarea>
                </label>
            </Show>

            <Show when=move || requires_browsers fallback=|| view! {}>
                <CheckboxGroup
                    legend="Browsers"
                    name="browser"
                    choices=browser_choices.clone()
                    selected=browsers
                />
            </Show>

            <Show when=move || requires_resolutions fallback=|| view! {}>
                <CheckboxGroup
                    legend="Resolutions"
                    name="resolution"
                    choices=resolution_choices.clone()
                    selected=resolutions
                />
            </Show>

            <Show when=move || requires_target_number fallback=|| view! {}>
                <label class="field">
                    <span class="field-label">"Target phone number"</span>
                    <input
                        type="tel"
                        prop:value=move || target_number.get()
                        on:input=move |ev| target_number.set(event_target_value(&ev))
                    />
                </label>
                <CheckboxGroup
                    legend="Options"
                    name="option"
                    choices=option_choices.clone()
                    selected=options
                />
            </Show>

            <Show when=move || requires_session_name fallback=|| view! {}>
                <label class="field">
                    <span class="field-label">"Session name"</span>
                    <input
                        type="text"
                        prop:value=move || session_name.get()
                        on:input=move |ev| session_name.set(event_target_value(&ev))
                    />
                </label>
            </Show>

            <Show when=move || error.get().is_some() fallback=|| view! {}>
                <div class="error-message">{move || error.get().unwrap_or_default()}</div>
            </Show>

            <button type="submit" class="upload-button">"Start Audit"</button>
        </form>
    }
}

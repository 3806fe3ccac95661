//! Screenshot and video browser.
//!
//! ```text
//! [Chrome] [Firefox]          ◄── one tab per browser
//!  ┌──────┐ ┌──────┐
//!  │ url  │ │ url  │          ◄── one tile per audited URL
//!  └──────┘ └──────┘
//!  1920 × 1080   375 × 667    ◄── grid of the selected tile
//! ```

use leptos::*;
use sitetester_core::render::media::NO_URLS;
use sitetester_core::render::{MediaBrowser, MediaItem};
use sitetester_core::ResultShape;

use crate::config::backend_url;

fn media_item(item: MediaItem, shape: ResultShape) -> impl IntoView {
    let src = backend_url(&item.src);
    let media = match shape {
        ResultShape::Videos => view! {
            <video class="media-video" src=src controls=true preload="metadata"></video>
        }
        .into_view(),
        _ => view! {
            <a href=src.clone() target="_blank">
                <img class="media-screenshot" src=src alt=item.label.clone() loading="lazy"/>
            </a>
        }
        .into_view(),
    };

    view! {
        <figure class="media-item">
            {media}
            <figcaption>{item.label}</figcaption>
        </figure>
    }
}

#[component]
pub fn MediaView(browser: MediaBrowser) -> impl IntoView {
    if browser.urls().is_empty() {
        return view! { <div class="empty-state">{NO_URLS}</div> }.into_view();
    }

    let browser = store_value(browser);
    let first_tab = browser.with_value(|b| {
        b.tabs()
            .into_iter()
            .find(|tab| tab.active)
            .map(|tab| tab.browser)
            .unwrap_or_default()
    });
    let (active_browser, set_active_browser) = create_signal(first_tab);
    let (active_url, set_active_url) = create_signal(None::<String>);

    let tabs = move || {
        browser.with_value(|b| {
            b.tabs()
                .into_iter()
                .map(|tab| {
                    let name = tab.browser.clone();
                    let is_active = {
                        let name = name.clone();
                        move || active_browser.with(|active| *active == name)
                    };
                    view! {
                        <button
                            class="media-tab"
                            class:active=is_active
                            on:click=move |_| {
                                set_active_browser.set(name.clone());
                                set_active_url.set(None);
                            }
                        >
                            {tab.browser}
                        </button>
                    }
                })
                .collect_view()
        })
    };

    let tiles = move || {
        let current = active_browser.get();
        browser.with_value(|b| {
            b.tiles(&current)
                .into_iter()
                .map(|tile| {
                    let url = tile.url.clone();
                    let is_selected = {
                        let url = url.clone();
                        move || active_url.with(|active| active.as_deref() == Some(url.as_str()))
                    };
                    view! {
                        <button
                            class="media-tile"
                            class:selected=is_selected
                            on:click=move |_| set_active_url.set(Some(url.clone()))
                        >
                            <span class="tile-url">{tile.url}</span>
                            <span class="tile-key">{tile.key}</span>
                        </button>
                    }
                })
                .collect_view()
        })
    };

    let grid = move || {
        let Some(url) = active_url.get() else {
            return ().into_view();
        };
        let current = active_browser.get();
        browser.with_value(|b| {
            let items = b.grid(&current, &url);
            if items.is_empty() {
                return view! { <div class="empty-state">{b.empty_message()}</div> }.into_view();
            }
            let shape = b.shape();
            view! {
                <div class="media-grid">
                    {items.into_iter().map(|item| media_item(item, shape)).collect_view()}
                </div>
            }
            .into_view()
        })
    };

    view! {
        <div class="media-browser">
            <div class="media-tabs">{tabs}</div>
            <div class="media-tiles">{tiles}</div>
            {grid}
        </div>
    }
    .into_view()
}

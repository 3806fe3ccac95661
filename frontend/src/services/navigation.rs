//! Page navigation, confirmation prompts and the notice sink.

use leptos::*;
use sitetester_core::{Navigation, Notice, Notifier};

use crate::types::PendingNotice;

/// Leave the page for `navigation`'s route.
pub fn navigate(navigation: Navigation) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.location().set_href(navigation.path()) {
        log::error!("❌ Navigation to {} failed: {:?}", navigation.path(), e);
    }
}

/// Blocking `window.confirm`; `false` when no window is available.
pub fn confirm(prompt: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(prompt).ok())
        .unwrap_or(false)
}

/// Raises notices in the page's modal.
#[derive(Clone, Copy)]
pub struct ModalNotifier {
    slot: WriteSignal<Option<PendingNotice>>,
}

impl ModalNotifier {
    pub fn new(slot: WriteSignal<Option<PendingNotice>>) -> Self {
        Self { slot }
    }

    /// Raise a notice that navigates once dismissed.
    pub fn notify_then(&self, notice: Notice, then: Option<Navigation>) {
        log::info!("{}", notice);
        self.slot.set(Some(PendingNotice { notice, then }));
    }
}

impl Notifier for ModalNotifier {
    fn notify(&self, notice: Notice) {
        self.notify_then(notice, None);
    }
}

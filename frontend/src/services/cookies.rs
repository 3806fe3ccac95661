//! Credential store over `document.cookie`.

use sitetester_core::{BearerToken, CookieStore, CredentialAccessor};
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

/// The page's cookies, read on every access.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentCookies;

impl CookieStore for DocumentCookies {
    fn cookie_header(&self) -> Option<String> {
        let document = web_sys::window()?.document()?;
        document.dyn_into::<HtmlDocument>().ok()?.cookie().ok()
    }
}

/// Current bearer token of the page.
pub fn bearer_token() -> Option<BearerToken> {
    CredentialAccessor::new(DocumentCookies).bearer_token()
}

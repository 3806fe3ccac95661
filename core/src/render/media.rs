//! Screenshot and video browsing.
//!
//! Assets are stored under a key derived from the page URL, so the same
//! URL always maps to the same files:
//!
//! ```text
//! https://www.example.com/blog/my-post.html  →  my-post__example.com
//! https://example.com/                       →  home__example.com
//! ```
//!
//! The view is a drill-down: a tab per browser, a tile per URL, then a
//! grid of items per resolution.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::model::{SessionConfig, SessionId};
use crate::profile::ResultShape;

/// Key returned for URLs that cannot be parsed.
pub const UNKNOWN_MEDIA_KEY: &str = "unknown__site";

pub const NO_URLS: &str = "No URLs found in this session.";
pub const NO_VIDEOS: &str = "No videos found for this URL and browser combination.";
pub const NO_SCREENSHOTS: &str = "No screenshots found for this URL and browser combination.";

const PAGE_NAME_LIMIT: usize = 50;

static UNSAFE_HOST_CHARS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").ok());
static UNSAFE_PAGE_CHARS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]").ok());
static DASH_RUNS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"-+").ok());

fn replace_all(pattern: &Lazy<Option<Regex>>, text: &str, with: &str) -> String {
    match Lazy::force(pattern) {
        Some(re) => re.replace_all(text, with).into_owned(),
        None => text.to_string(),
    }
}

// =============================================================================
// Media Key
// =============================================================================

/// Deterministic asset stem of a page URL: `{page}__{domain}`.
pub fn media_key(raw: &str) -> String {
    let Some(url) = Url::parse(raw.trim()).ok() else {
        return UNKNOWN_MEDIA_KEY.to_string();
    };
    let Some(host) = url.host_str() else {
        return UNKNOWN_MEDIA_KEY.to_string();
    };

    let host = host.strip_prefix("www.").unwrap_or(host);
    let domain = replace_all(&UNSAFE_HOST_CHARS, host, "-");

    format!("{}__{}", page_name(url.path()), domain)
}

/// Last path segment, sanitized; `home` for the site root and index pages.
fn page_name(path: &str) -> String {
    let Some(segment) = path.split('/').rfind(|s| !s.is_empty()) else {
        return "home".to_string();
    };

    let stem = segment.split('.').next().unwrap_or_default();
    let sanitized = replace_all(&UNSAFE_PAGE_CHARS, stem, "-");
    let collapsed = replace_all(&DASH_RUNS, &sanitized, "-");
    let name = collapsed.trim_matches('-').to_lowercase();

    if name.is_empty() || name == "index" {
        return "home".to_string();
    }
    if name.chars().count() > PAGE_NAME_LIMIT {
        let cut: String = name.chars().take(PAGE_NAME_LIMIT - 3).collect();
        return format!("{}...", cut);
    }
    name
}

/// `1920x1080` → `1920 × 1080`.
pub fn resolution_label(resolution: &str) -> String {
    match resolution.split_once('x') {
        Some((width, height)) => format!("{} × {}", width, height),
        None => resolution.to_string(),
    }
}

// =============================================================================
// Media Browser
// =============================================================================

/// A browser tab.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaTab {
    pub browser: String,
    pub active: bool,
}

/// A selectable URL tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaTile {
    pub browser: String,
    pub url: String,
    pub key: String,
}

/// One screenshot or video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaItem {
    pub resolution: String,
    pub label: String,
    pub src: String,
}

/// Drill-down over the media of one session.
#[derive(Clone, Debug)]
pub struct MediaBrowser {
    shape: ResultShape,
    session: SessionId,
    config: SessionConfig,
    browsers: Vec<String>,
    resolutions: Vec<String>,
}

impl MediaBrowser {
    /// Browse with the browsers and resolutions stored in the config.
    pub fn new(shape: ResultShape, session: SessionId, config: SessionConfig) -> Self {
        Self {
            browsers: config.browsers.clone(),
            resolutions: config.resolutions.clone(),
            shape,
            session,
            config,
        }
    }

    /// Prefer the selections made at submission time when there are any.
    pub fn with_selection(mut self, browsers: &[String], resolutions: &[String]) -> Self {
        if !browsers.is_empty() {
            self.browsers = browsers.to_vec();
        }
        if !resolutions.is_empty() {
            self.resolutions = resolutions.to_vec();
        }
        self
    }

    pub fn shape(&self) -> ResultShape {
        self.shape
    }

    pub fn urls(&self) -> &[String] {
        &self.config.urls
    }

    pub fn resolutions(&self) -> &[String] {
        &self.resolutions
    }

    /// One tab per browser; the first is active.
    pub fn tabs(&self) -> Vec<MediaTab> {
        self.browsers
            .iter()
            .enumerate()
            .map(|(i, browser)| MediaTab {
                browser: browser.clone(),
                active: i == 0,
            })
            .collect()
    }

    /// One tile per configured URL; empty means [`NO_URLS`].
    pub fn tiles(&self, browser: &str) -> Vec<MediaTile> {
        self.config
            .urls
            .iter()
            .map(|url| MediaTile {
                browser: browser.to_string(),
                url: url.clone(),
                key: media_key(url),
            })
            .collect()
    }

    /// Media of one (browser, url) pair; empty means [`Self::empty_message`].
    pub fn grid(&self, browser: &str, url: &str) -> Vec<MediaItem> {
        match self.shape {
            ResultShape::Videos => self
                .config
                .results
                .iter()
                .filter(|record| record.url == url && record.browser == browser)
                .filter_map(|record| {
                    record.video_path.as_ref().map(|path| MediaItem {
                        resolution: record.resolution.clone(),
                        label: resolution_label(&record.resolution),
                        src: path.clone(),
                    })
                })
                .collect(),
            _ => {
                let key = media_key(url);
                self.resolutions
                    .iter()
                    .map(|resolution| MediaItem {
                        resolution: resolution.clone(),
                        label: resolution_label(resolution),
                        src: format!(
                            "/screenshots/{}/{}/{}__{}.png",
                            self.session, browser, key, resolution
                        ),
                    })
                    .collect()
            }
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self.shape {
            ResultShape::Videos => NO_VIDEOS,
            _ => NO_SCREENSHOTS,
        }
    }
}

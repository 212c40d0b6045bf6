use crate::browser::BrowserSession;
use crate::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use url::Url;

/// Class Shopee puts on a pager arrow that cannot be followed
pub const DISABLED_CLASS: &str = "shopee-icon-button--disabled";

const READ_PAGER_JS: &str = r#"
(function() {
    function button(selector) {
        const el = document.querySelector(selector);
        if (!el) return { present: false, disabledClass: false, href: null };
        return {
            present: true,
            disabledClass: el.classList.contains('shopee-icon-button--disabled'),
            href: el.getAttribute('href')
        };
    }
    return JSON.stringify({
        url: window.location.href,
        hasPageParam: new URLSearchParams(window.location.search).has('page'),
        prev: button('.shopee-icon-button--left'),
        next: button('.shopee-icon-button--right')
    });
})()
"#;

/// One of the pager arrows next to the result grid
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PagerButton {
    pub present: bool,
    pub disabled_class: bool,
    pub href: Option<String>,
}

impl PagerButton {
    /// Shopee points exhausted arrows at "/" instead of removing them
    fn points_home(&self) -> bool {
        self.href.as_deref() == Some("/")
    }

    fn disabled(&self) -> bool {
        self.present && (self.disabled_class || self.points_home())
    }

    /// Href to follow, if any
    pub fn target(&self) -> Option<&str> {
        self.href.as_deref().filter(|href| !href.is_empty() && *href != "/")
    }
}

/// Pager arrows of the current results page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PagerState {
    pub url: String,
    pub has_page_param: bool,
    pub prev: PagerButton,
    pub next: PagerButton,
}

impl PagerState {
    /// The first page carries no `page` parameter, so BACK is always disabled there
    pub fn prev_disabled(&self) -> bool {
        !self.has_page_param || self.prev.disabled()
    }

    pub fn next_disabled(&self) -> bool {
        self.next.disabled()
    }

    /// Absolute URL of the previous page, when BACK can be followed
    pub fn prev_url(&self) -> Option<String> {
        if self.prev_disabled() {
            return None;
        }
        self.prev.target().and_then(|href| resolve(&self.url, href))
    }

    /// Absolute URL of the next page, when NEXT can be followed
    pub fn next_url(&self) -> Option<String> {
        if self.next_disabled() {
            return None;
        }
        self.next.target().and_then(|href| resolve(&self.url, href))
    }
}

fn resolve(base: &str, href: &str) -> Option<String> {
    Url::parse(base).and_then(|base| base.join(href)).map(String::from).ok()
}

/// Read the pager arrows of the active tab
pub fn read_pager(session: &BrowserSession) -> Result<PagerState> {
    session
        .evaluate_json(READ_PAGER_JS)
        .map_err(|e| TrackerError::ExtractionFailed(format!("Failed to read pager: {}", e)))
}

fn follow(session: &BrowserSession, target: Option<String>) -> Result<bool> {
    match target {
        Some(url) => {
            log::debug!("Following pager to {}", url);
            session.navigate(&url)?;
            session.wait_for_navigation()?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Go to the previous results page. Returns `false` when BACK is disabled.
pub fn go_prev(session: &BrowserSession) -> Result<bool> {
    let state = read_pager(session)?;
    follow(session, state.prev_url())
}

/// Go to the next results page. Returns `false` when NEXT is disabled.
pub fn go_next(session: &BrowserSession) -> Result<bool> {
    let state = read_pager(session)?;
    follow(session, state.next_url())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(href: &str) -> PagerButton {
        PagerButton { present: true, disabled_class: false, href: Some(href.to_string()) }
    }

    fn state(url: &str, prev: PagerButton, next: PagerButton) -> PagerState {
        PagerState {
            url: url.to_string(),
            has_page_param: url.contains("page="),
            prev,
            next,
        }
    }

    #[test]
    fn test_first_page_has_no_back() {
        let s = state("https://shopee.sg/search?keyword=bag", button("/search?keyword=bag&page=0"), button("/search?keyword=bag&page=1"));
        assert!(s.prev_disabled());
        assert!(s.prev_url().is_none());
        assert!(!s.next_disabled());
        assert_eq!(s.next_url().as_deref(), Some("https://shopee.sg/search?keyword=bag&page=1"));
    }

    #[test]
    fn test_middle_page_resolves_both() {
        let s = state(
            "https://shopee.sg/search?keyword=bag&page=2",
            button("/search?keyword=bag&page=1"),
            button("/search?keyword=bag&page=3"),
        );
        assert_eq!(s.prev_url().as_deref(), Some("https://shopee.sg/search?keyword=bag&page=1"));
        assert_eq!(s.next_url().as_deref(), Some("https://shopee.sg/search?keyword=bag&page=3"));
    }

    #[test]
    fn test_disabled_class() {
        let mut next = button("/search?keyword=bag&page=9");
        next.disabled_class = true;
        let s = state("https://shopee.sg/search?keyword=bag&page=8", button("/search?keyword=bag&page=7"), next);
        assert!(s.next_disabled());
        assert!(s.next_url().is_none());
    }

    #[test]
    fn test_home_href_disables() {
        let s = state("https://shopee.sg/search?keyword=bag&page=8", button("/"), button("/"));
        assert!(s.prev_disabled());
        assert!(s.next_disabled());
    }

    #[test]
    fn test_missing_button_is_not_disabled_but_has_no_target() {
        let s = state("https://shopee.sg/search?keyword=bag&page=1", PagerButton::default(), PagerButton::default());
        assert!(!s.next_disabled());
        assert!(!s.prev_disabled());
        assert!(s.next_url().is_none());
        assert!(s.prev_url().is_none());
    }

    #[test]
    fn test_pager_state_deserializes_script_output() {
        let json = r#"{
            "url": "https://shopee.sg/search?keyword=bag&page=1",
            "hasPageParam": true,
            "prev": {"present": true, "disabledClass": false, "href": "/search?keyword=bag&page=0"},
            "next": {"present": false, "disabledClass": false, "href": null}
        }"#;
        let s: PagerState = serde_json::from_str(json).unwrap();
        assert!(s.has_page_param);
        assert_eq!(s.prev.target(), Some("/search?keyword=bag&page=0"));
        assert!(!s.next.present);
    }
}

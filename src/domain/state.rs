use reqwest::header::{HeaderMap, HeaderValue, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};

/// Revalidation headers remembered between polls.
///
/// Holds at most one `If-None-Match` and one `If-Modified-Since` value. A value
/// is only ever replaced by a newer, different one; nothing clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validators {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_none_match: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_modified_since: Option<String>,
}

impl Validators {
    pub fn is_empty(&self) -> bool {
        self.if_none_match.is_none() && self.if_modified_since.is_none()
    }

    /// Decide whether a response describes a changed resource.
    ///
    /// `ETag` is consulted first; `Last-Modified` only when no `ETag` was sent.
    /// A differing value is stored. Returns `None` when the response carries
    /// neither validator.
    pub fn observe(&mut self, headers: &HeaderMap) -> Option<bool> {
        if let Some(etag) = header_str(headers, &ETAG) {
            return Some(replace_if_different(&mut self.if_none_match, etag));
        }

        if let Some(last_modified) = header_str(headers, &LAST_MODIFIED) {
            return Some(replace_if_different(
                &mut self.if_modified_since,
                last_modified,
            ));
        }

        None
    }

    /// Remember every validator present in `headers`.
    pub fn record(&mut self, headers: &HeaderMap) {
        if let Some(etag) = header_str(headers, &ETAG) {
            replace_if_different(&mut self.if_none_match, etag);
        }
        if let Some(last_modified) = header_str(headers, &LAST_MODIFIED) {
            replace_if_different(&mut self.if_modified_since, last_modified);
        }
    }

    /// Render as request headers. Values that are not valid header text are skipped.
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(etag) = &self.if_none_match {
            if let Ok(value) = HeaderValue::from_str(etag) {
                headers.insert(IF_NONE_MATCH, value);
            }
        }

        if let Some(last_modified) = &self.if_modified_since {
            if let Ok(value) = HeaderValue::from_str(last_modified) {
                headers.insert(IF_MODIFIED_SINCE, value);
            }
        }

        headers
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &reqwest::header::HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn replace_if_different(slot: &mut Option<String>, observed: &str) -> bool {
    if slot.as_deref() == Some(observed) {
        return false;
    }
    *slot = Some(observed.to_string());
    true
}

/// Per-source state carried from one poll to the next.
///
/// Owned by the caller for the lifetime of a watch session and handed to the
/// fetcher by `&mut`, so two polls of the same source can never overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchState {
    /// Body text of the last fetch, or the input kind for non-URL inputs.
    pub last_value: Option<String>,
    pub validators: Validators,
    /// `None` until the first probe answers.
    pub head_supported: Option<bool>,
    pub last_url: Option<String>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State for a session that should never probe with HEAD.
    pub fn without_head_probe() -> Self {
        Self {
            head_supported: Some(false),
            ..Self::default()
        }
    }

    pub fn is_first_poll(&self) -> bool {
        self.last_value.is_none()
    }

    /// A probe needs a baseline and a server not known to reject HEAD.
    pub fn should_probe(&self) -> bool {
        !self.is_first_poll() && self.head_supported != Some(false)
    }
}

use sha2::{Digest, Sha256};

use crate::domain::{ResolvedInput, Response};

/// Result of one poll of one source.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// First sighting or changed content. `bytes` is `None` for file and
    /// inline inputs, which the caller reads itself.
    Content {
        bytes: Option<Vec<u8>>,
        input: ResolvedInput,
    },
    /// Nothing to do this cycle. Carries the response that proved it, when
    /// there was one.
    NotModified { response: Option<Response> },
    /// The resource is unavailable right now; try again next cycle.
    NotOk { response: Response },
}

impl FetchOutcome {
    pub fn is_content(&self) -> bool {
        matches!(self, FetchOutcome::Content { .. })
    }

    pub fn is_not_modified(&self) -> bool {
        matches!(self, FetchOutcome::NotModified { .. })
    }

    pub fn is_not_ok(&self) -> bool {
        matches!(self, FetchOutcome::NotOk { .. })
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            FetchOutcome::Content { bytes, .. } => bytes.as_deref(),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Content { .. } => None,
            FetchOutcome::NotModified { response } => response.as_ref(),
            FetchOutcome::NotOk { response } => Some(response),
        }
    }

    /// SHA256 of fetched content, hex encoded.
    pub fn content_digest(&self) -> Option<String> {
        self.bytes().map(content_digest)
    }
}

pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

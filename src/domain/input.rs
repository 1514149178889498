use std::fmt;
use std::path::PathBuf;

use url::Url;

/// Inline document data, either text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawData {
    Text(String),
    Bytes(Vec<u8>),
}

impl RawData {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RawData::Text(text) => text.as_bytes(),
            RawData::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unresolved reference to a document, as the user supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRef {
    /// A URL or a filesystem path.
    Location(String),
    /// Data supplied directly by the caller.
    Inline(RawData),
}

impl InputRef {
    pub fn location(location: impl Into<String>) -> Self {
        InputRef::Location(location.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        InputRef::Inline(RawData::Text(text.into()))
    }

    /// Classify the reference into a concrete input.
    ///
    /// `http` and `https` URLs are fetched over the network, `file://` URLs
    /// and every other location are treated as local paths.
    pub fn resolve(&self) -> ResolvedInput {
        match self {
            InputRef::Location(location) => match Url::parse(location) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => ResolvedInput::Url {
                    path: location.clone(),
                },
                Ok(url) if url.scheme() == "file" => ResolvedInput::File {
                    path: url
                        .to_file_path()
                        .unwrap_or_else(|_| PathBuf::from(url.path())),
                },
                _ => ResolvedInput::File {
                    path: PathBuf::from(location),
                },
            },
            InputRef::Inline(data) => ResolvedInput::Raw { data: data.clone() },
        }
    }
}

impl From<&str> for InputRef {
    fn from(location: &str) -> Self {
        InputRef::location(location)
    }
}

impl From<String> for InputRef {
    fn from(location: String) -> Self {
        InputRef::Location(location)
    }
}

impl fmt::Display for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputRef::Location(location) => f.write_str(location),
            InputRef::Inline(data) => write!(f, "<inline, {} bytes>", data.len()),
        }
    }
}

/// A concrete input, computed once per fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    Url { path: String },
    File { path: PathBuf },
    Raw { data: RawData },
}

impl ResolvedInput {
    /// Short name of the variant; doubles as the first-sighting marker for
    /// inputs that are never revalidated.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolvedInput::Url { .. } => "url",
            ResolvedInput::File { .. } => "file",
            ResolvedInput::Raw { .. } => "raw",
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, ResolvedInput::Url { .. })
    }
}

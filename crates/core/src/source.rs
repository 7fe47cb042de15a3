// Media source type resolution and data source selection

use crate::error::{PlayerError, Result};
use std::collections::HashMap;
use url::Url;

pub const FORMAT_SS: &str = "ss";
pub const FORMAT_DASH: &str = "dash";
pub const FORMAT_HLS: &str = "hls";
pub const FORMAT_OTHER: &str = "other";

/// User agent sent by the HTTP data source
pub const DEFAULT_USER_AGENT: &str = "ExoPlayer";

/// Concrete media source type handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    /// Smooth Streaming manifest
    Smooth,
    /// DASH manifest
    Dash,
    /// HLS playlist
    Hls,
    /// Plain progressive container (mp4, webm, mkv, ...)
    Progressive,
}

impl SourceType {
    /// Map an explicit format hint. Only the four literal tags are accepted.
    pub fn from_hint(hint: &str) -> Result<Self> {
        match hint {
            FORMAT_SS => Ok(SourceType::Smooth),
            FORMAT_DASH => Ok(SourceType::Dash),
            FORMAT_HLS => Ok(SourceType::Hls),
            FORMAT_OTHER => Ok(SourceType::Progressive),
            other => Err(PlayerError::UnsupportedMediaType(format!(
                "Unsupported format hint: {}",
                other
            ))),
        }
    }

    /// Infer the type from a URI's last path segment.
    ///
    /// | last segment                        | type        |
    /// |-------------------------------------|-------------|
    /// | `*.m3u8`                            | Hls         |
    /// | `*.mpd`                             | Dash        |
    /// | `*.ism`, `*.isml`                   | Smooth      |
    /// | `manifest` after an `.ism(l)` segment | Smooth    |
    /// | anything else                       | Progressive |
    pub fn infer(segments: &[&str]) -> Self {
        let last = match segments.last() {
            Some(last) => last.to_ascii_lowercase(),
            None => return SourceType::Progressive,
        };

        if last.ends_with(".m3u8") {
            SourceType::Hls
        } else if last.ends_with(".mpd") {
            SourceType::Dash
        } else if is_smooth_segment(&last) {
            SourceType::Smooth
        } else if is_smooth_manifest_suffix(&last)
            && segments.len() >= 2
            && is_smooth_segment(&segments[segments.len() - 2].to_ascii_lowercase())
        {
            SourceType::Smooth
        } else {
            SourceType::Progressive
        }
    }
}

fn is_smooth_segment(segment: &str) -> bool {
    segment.ends_with(".ism") || segment.ends_with(".isml")
}

fn is_smooth_manifest_suffix(segment: &str) -> bool {
    segment == "manifest" || (segment.starts_with("manifest(") && segment.ends_with(')'))
}

/// Where the engine pulls bytes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// HTTP(S) with default request properties
    Http {
        user_agent: String,
        allow_cross_protocol_redirects: bool,
        headers: HashMap<String, String>,
    },
    /// Files, assets, content providers
    Local,
}

/// Resolved, immutable description of the media to play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSourceSpec {
    pub uri: String,
    pub source_type: SourceType,
    pub data_source: DataSource,
}

/// Resolve a URI plus optional format hint into a source spec
pub struct MediaSourceResolver;

impl MediaSourceResolver {
    /// Resolve only the source type
    pub fn resolve(uri: &str, format_hint: Option<&str>) -> Result<SourceType> {
        if uri.trim().is_empty() {
            return Err(PlayerError::UnsupportedMediaType(
                "Empty data source".to_string(),
            ));
        }

        match format_hint {
            Some(hint) => SourceType::from_hint(hint),
            None => {
                let parsed = ParsedUri::parse(uri);
                Ok(SourceType::infer(&parsed.segments()))
            }
        }
    }

    /// Resolve the full source spec including the data source
    pub fn resolve_spec(
        uri: &str,
        format_hint: Option<&str>,
        http_headers: &HashMap<String, String>,
    ) -> Result<MediaSourceSpec> {
        let source_type = Self::resolve(uri, format_hint)?;

        let data_source = if ParsedUri::parse(uri).is_http() {
            DataSource::Http {
                user_agent: DEFAULT_USER_AGENT.to_string(),
                allow_cross_protocol_redirects: true,
                headers: http_headers.clone(),
            }
        } else {
            DataSource::Local
        };

        log::debug!("Resolved {} as {:?} ({:?})", uri, source_type, data_source);

        Ok(MediaSourceSpec {
            uri: uri.to_string(),
            source_type,
            data_source,
        })
    }
}

/// Absolute URLs go through `url`; bare paths are split by hand
enum ParsedUri {
    Absolute(Url),
    Path(String),
}

impl ParsedUri {
    fn parse(uri: &str) -> Self {
        match Url::parse(uri) {
            Ok(url) => ParsedUri::Absolute(url),
            Err(_) => {
                let end = uri.find(['?', '#']).unwrap_or(uri.len());
                ParsedUri::Path(uri[..end].to_string())
            }
        }
    }

    fn is_http(&self) -> bool {
        match self {
            ParsedUri::Absolute(url) => matches!(url.scheme(), "http" | "https"),
            ParsedUri::Path(_) => false,
        }
    }

    fn segments(&self) -> Vec<&str> {
        let path = match self {
            ParsedUri::Absolute(url) => url.path(),
            ParsedUri::Path(path) => path.as_str(),
        };
        path.split('/').filter(|s| !s.is_empty()).collect()
    }
}

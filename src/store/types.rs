use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::util::BodyError;

// ============================================================================
// Error Types
// ============================================================================

/// Errors produced by a single remote store operation.
///
/// None of these are retried. `NotConfigured` is a mode, not a failure:
/// callers translate it into default data (load) or a local-only save.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No endpoint URL is set.
    #[error("Remote store endpoint is not configured")]
    NotConfigured,
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// The response was not JSON or had the wrong shape.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<BodyError> for StoreError {
    fn from(e: BodyError) -> Self {
        match e {
            BodyError::Network(e) => StoreError::Network(e),
            BodyError::TooLarge(limit) => StoreError::ResponseTooLarge(limit),
            BodyError::NotUtf8 => {
                StoreError::MalformedPayload("response is not valid UTF-8".to_string())
            }
        }
    }
}

// ============================================================================
// Theme Palette
// ============================================================================

/// Accent color for the profile card.
///
/// Serialized as the palette token the page stylesheet understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeColor {
    #[serde(rename = "bg-[#ccff00]")]
    NeonGreen,
    #[serde(rename = "bg-[#ff90e8]")]
    HotPink,
    #[serde(rename = "bg-[#23a6d5]")]
    Cyan,
    #[serde(rename = "bg-[#ffc900]")]
    Yellow,
    #[serde(rename = "bg-[#ff6b6b]")]
    Orange,
}

impl ThemeColor {
    pub const ALL: [ThemeColor; 5] = [
        ThemeColor::NeonGreen,
        ThemeColor::HotPink,
        ThemeColor::Cyan,
        ThemeColor::Yellow,
        ThemeColor::Orange,
    ];

    pub fn token(self) -> &'static str {
        match self {
            ThemeColor::NeonGreen => "bg-[#ccff00]",
            ThemeColor::HotPink => "bg-[#ff90e8]",
            ThemeColor::Cyan => "bg-[#23a6d5]",
            ThemeColor::Yellow => "bg-[#ffc900]",
            ThemeColor::Orange => "bg-[#ff6b6b]",
        }
    }

    /// Human-facing name, as typed on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ThemeColor::NeonGreen => "neon-green",
            ThemeColor::HotPink => "hot-pink",
            ThemeColor::Cyan => "cyan",
            ThemeColor::Yellow => "yellow",
            ThemeColor::Orange => "orange",
        }
    }

    /// Accepts either the palette token or the human name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.token() == s || c.name().eq_ignore_ascii_case(s))
    }
}

/// Link background tokens offered by the editor.
pub const AVAILABLE_COLORS: [&str; 6] = [
    "bg-[#ccff00]",
    "bg-[#ff90e8]",
    "bg-[#23a6d5]",
    "bg-[#ffc900]",
    "bg-[#ff6b6b]",
    "bg-white",
];

/// Resolve a color given by name (`pink`, `white`, ...) or token to a palette token.
pub fn resolve_link_color(input: &str) -> Option<&'static str> {
    let input = input.trim();
    if let Some(token) = AVAILABLE_COLORS.iter().find(|t| **t == input) {
        return Some(token);
    }
    if input.eq_ignore_ascii_case("white") {
        return Some("bg-white");
    }
    if input.eq_ignore_ascii_case("pink") {
        return Some(ThemeColor::HotPink.token());
    }
    ThemeColor::parse(input).map(ThemeColor::token)
}

// ============================================================================
// Records
// ============================================================================

/// The page owner's profile. One per installation; overwritten, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub bio: String,
    pub avatar_url: String,
    pub theme_color: ThemeColor,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "ALEX_RDR".to_string(),
            bio: "DIGITAL CREATOR // REACT DEV // BASED IN JKT".to_string(),
            avatar_url: DEFAULT_AVATAR_URL.to_string(),
            theme_color: ThemeColor::NeonGreen,
        }
    }
}

pub const DEFAULT_AVATAR_URL: &str = "https://picsum.photos/seed/landscape/200/200";

/// One outbound link. Render order is list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub title: String,
    pub url: String,
    pub color: String,
}

impl LinkItem {
    /// Template for a freshly added slot.
    pub fn blank(id: String) -> Self {
        Self {
            id,
            title: "NEW LINK".to_string(),
            url: "https://".to_string(),
            color: "bg-white".to_string(),
        }
    }
}

/// Spreadsheet cells come back as numbers when the id looks numeric.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(f) if f.fract() == 0.0 => format!("{}", f as i64),
        RawId::Float(f) => f.to_string(),
    })
}

/// Built-in link list used when nothing better is available.
pub fn default_links() -> Vec<LinkItem> {
    [
        ("1", "MY PORTFOLIO", "https://example.com", "bg-[#ff90e8]"),
        ("2", "LATEST YOUTUBE VIDEO", "https://youtube.com", "bg-[#23a6d5]"),
        ("3", "READ MY BLOG", "https://medium.com", "bg-[#ffc900]"),
        ("4", "BUY ME COFFEE", "https://buymeacoffee.com", "bg-white"),
    ]
    .into_iter()
    .map(|(id, title, url, color)| LinkItem {
        id: id.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        color: color.to_string(),
    })
    .collect()
}

// ============================================================================
// Writes
// ============================================================================

/// Which record a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveKind {
    Profile,
    Links,
}

impl SaveKind {
    /// Action discriminator understood by the endpoint.
    pub fn action(self) -> &'static str {
        match self {
            SaveKind::Profile => "saveProfile",
            SaveKind::Links => "saveLinks",
        }
    }
}

/// A full-record write to the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    Profile(Profile),
    Links(Vec<LinkItem>),
}

impl StoreWrite {
    pub fn kind(&self) -> SaveKind {
        match self {
            StoreWrite::Profile(_) => SaveKind::Profile,
            StoreWrite::Links(_) => SaveKind::Links,
        }
    }

    /// JSON request body: `{ "action": ..., "data": ... }`.
    pub fn to_body(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Body<'a, T: Serialize> {
            action: &'a str,
            data: &'a T,
        }

        let action = self.kind().action();
        match self {
            StoreWrite::Profile(profile) => serde_json::to_string(&Body {
                action,
                data: profile,
            }),
            StoreWrite::Links(links) => serde_json::to_string(&Body {
                action,
                data: links,
            }),
        }
    }
}

/// Combined state as loaded at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub profile: Profile,
    pub links: Vec<LinkItem>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            links: default_links(),
        }
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// What a route in a service's URL table points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadKind {
    Album,
    Artist,
    Track,
    Playlist,
}

/// Static description of a catalog module.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceInfo {
    /// Module identifier as written in the settings file, e.g. `subsonic`.
    pub module: String,
    /// Human readable service name shown in menus.
    pub service_name: String,
    /// Key into the well-known domain table.
    pub netlocation: String,
    /// Ordered `path segment -> kind` routes used to build links.
    pub url_routes: Vec<(String, DownloadKind)>,
    pub hidden: bool,
}

impl ServiceInfo {
    /// Path segment of the first route serving albums.
    pub fn album_route(&self) -> Option<&str> {
        self.url_routes
            .iter()
            .find(|(_, kind)| *kind == DownloadKind::Album)
            .map(|(path, _)| path.as_str())
    }
}

/// One artist returned by a catalog search.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchHit {
    pub result_id: String,
    pub name: String,
    pub year: Option<String>,
    pub additional: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArtistInfo {
    pub name: String,
    /// Album identifiers in the order the service lists them.
    pub albums: Vec<String>,
}

/// Album metadata as reported by a catalog.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlbumInfo {
    pub name: String,
    pub artist: String,
    pub release_year: Option<u32>,
    pub duration: Option<u64>,
    pub explicit: bool,
    pub quality: Option<String>,
    /// Identifier the album was requested under.
    pub album_id: Option<String>,
    /// Identifier the service put in the album record itself.
    pub id: Option<String>,
    /// Remaining raw attributes of the service record.
    pub extra: BTreeMap<String, Value>,
}

impl AlbumInfo {
    pub fn year_label(&self) -> String {
        self.release_year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

impl fmt::Display for AlbumInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.year_label())
    }
}

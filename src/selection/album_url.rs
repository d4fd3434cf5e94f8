//! Best-effort reconstruction of a canonical album link.
//!
//! A link is `https://{domain}/{album path}/{album id}`. The domain comes from
//! a small table of well-known services, the path from the service's route
//! table, and the id from the first extraction strategy in [`ID_STRATEGIES`]
//! that yields a value. When no strategy does, a pseudo identifier is derived
//! with [`pseudo_album_id`]. Anything that still goes wrong degrades to a
//! `#` comment line, so building a link never fails.
use crate::catalog::{AlbumInfo, ServiceInfo};
use crate::foundation::utils::sanitize_name;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Net-location constants with a known public domain.
const KNOWN_DOMAINS: [(&str, &str); 5] = [
    ("qobuz", "play.qobuz.com"),
    ("tidal", "tidal.com"),
    ("spotify", "open.spotify.com"),
    ("deezer", "deezer.com"),
    ("apple", "music.apple.com"),
];

const DEFAULT_ALBUM_PATH: &str = "album";

/// Number of decimal digits in a pseudo identifier.
const PSEUDO_ID_DIGITS: u32 = 10;

/// Where an album identifier may be found, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    /// The id the album was requested under.
    RequestedId,
    /// The id carried by the album record itself.
    RecordId,
    /// A raw attribute of the album record.
    Attribute(&'static str),
}

pub const ID_STRATEGIES: [IdStrategy; 6] = [
    IdStrategy::RequestedId,
    IdStrategy::RecordId,
    IdStrategy::Attribute("album_id"),
    IdStrategy::Attribute("id"),
    IdStrategy::Attribute("albumId"),
    IdStrategy::Attribute("albumID"),
];

impl IdStrategy {
    pub fn extract(self, album: &AlbumInfo) -> Option<String> {
        let found = match self {
            IdStrategy::RequestedId => album.album_id.clone(),
            IdStrategy::RecordId => album.id.clone(),
            IdStrategy::Attribute(key) => match album.extra.get(key) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            },
        };
        found.filter(|id| !id.trim().is_empty())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum AlbumUrlError {
    UnknownService,
    EmptyNetlocation,
}

impl fmt::Display for AlbumUrlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AlbumUrlError::UnknownService => write!(f, "album has no known service"),
            AlbumUrlError::EmptyNetlocation => write!(f, "service has no net location"),
        }
    }
}

impl std::error::Error for AlbumUrlError {}

/// Domain for a net-location constant: the well-known table, else `{netlocation}.com`.
pub fn domain_for(netlocation: &str) -> String {
    KNOWN_DOMAINS
        .iter()
        .find(|(key, _)| *key == netlocation)
        .map(|(_, domain)| domain.to_string())
        .unwrap_or_else(|| format!("{netlocation}.com"))
}

/// Identifier from the first strategy that produces one.
pub fn resolve_album_id(album: &AlbumInfo) -> Option<String> {
    ID_STRATEGIES
        .iter()
        .find_map(|strategy| strategy.extract(album))
}

/// Stable 10-digit identifier for an album without one.
///
/// The key `"{name}_{artist}_{year}"` is hashed with SHA-256; the first eight
/// bytes of the digest are read as a big-endian `u64`, reduced modulo 10^10
/// and zero-padded to ten digits. The result only depends on the key.
pub fn pseudo_album_id(album: &AlbumInfo) -> String {
    let key = format!("{}_{}_{}", album.name, album.artist, album.year_label());
    let digest = Sha256::digest(key.as_bytes());

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let value = u64::from_be_bytes(prefix) % 10u64.pow(PSEUDO_ID_DIGITS);

    format!("{value:0width$}", width = PSEUDO_ID_DIGITS as usize)
}

/// Builds the canonical link, reporting why it could not be built.
pub fn try_album_url(
    service: Option<&ServiceInfo>,
    album: &AlbumInfo,
) -> Result<String, AlbumUrlError> {
    let service = service.ok_or(AlbumUrlError::UnknownService)?;
    let netlocation = service.netlocation.trim();
    if netlocation.is_empty() {
        return Err(AlbumUrlError::EmptyNetlocation);
    }

    let domain = domain_for(netlocation);
    let path = service.album_route().unwrap_or(DEFAULT_ALBUM_PATH);
    let id = resolve_album_id(album).unwrap_or_else(|| pseudo_album_id(album));

    Ok(format!("https://{domain}/{path}/{id}"))
}

/// Placeholder line written instead of a link.
pub fn placeholder_comment(album: &AlbumInfo) -> String {
    format!(
        "# {} ({}) - {}",
        sanitize_name(&album.name),
        album.year_label(),
        album.artist
    )
}

/// Builds the canonical link, or a `#` placeholder line when that fails.
pub fn album_url(service: Option<&ServiceInfo>, album: &AlbumInfo) -> String {
    try_album_url(service, album).unwrap_or_else(|e| {
        tracing::warn!(album = %album.name, error = %e, "could not build album link");
        placeholder_comment(album)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DownloadKind;
    use serde_json::json;

    fn service(netlocation: &str, routes: Vec<(&str, DownloadKind)>) -> ServiceInfo {
        ServiceInfo {
            module: netlocation.to_string(),
            service_name: netlocation.to_string(),
            netlocation: netlocation.to_string(),
            url_routes: routes
                .into_iter()
                .map(|(path, kind)| (path.to_string(), kind))
                .collect(),
            hidden: false,
        }
    }

    fn album(name: &str) -> AlbumInfo {
        AlbumInfo {
            name: name.to_string(),
            artist: "Radiohead".to_string(),
            release_year: Some(1997),
            ..Default::default()
        }
    }

    #[test]
    fn test_known_domain_and_album_route() {
        let qobuz = service(
            "qobuz",
            vec![("artist", DownloadKind::Artist), ("album", DownloadKind::Album)],
        );
        let mut info = album("OK Computer");
        info.album_id = Some("0634904032432".to_string());

        assert_eq!(
            album_url(Some(&qobuz), &info),
            "https://play.qobuz.com/album/0634904032432"
        );
    }

    #[test]
    fn test_unknown_domain_falls_back_to_dot_com() {
        let beatport = service("beatport", vec![("release", DownloadKind::Album)]);
        let mut info = album("Kid A");
        info.id = Some("42".to_string());

        assert_eq!(album_url(Some(&beatport), &info), "https://beatport.com/release/42");
    }

    #[test]
    fn test_missing_album_route_uses_default_path() {
        let tidal = service("tidal", vec![("track", DownloadKind::Track)]);
        let mut info = album("Amnesiac");
        info.id = Some("77".to_string());

        assert_eq!(album_url(Some(&tidal), &info), "https://tidal.com/album/77");
    }

    #[test]
    fn test_id_strategies_are_tried_in_order() {
        let mut info = album("Hail to the Thief");
        info.extra.insert("albumID".to_string(), json!("upper"));
        info.extra.insert("albumId".to_string(), json!(99));
        assert_eq!(resolve_album_id(&info).as_deref(), Some("99"));

        info.id = Some("record".to_string());
        assert_eq!(resolve_album_id(&info).as_deref(), Some("record"));

        info.album_id = Some("   ".to_string());
        assert_eq!(resolve_album_id(&info).as_deref(), Some("record"));

        info.album_id = Some("requested".to_string());
        assert_eq!(resolve_album_id(&info).as_deref(), Some("requested"));
    }

    #[test]
    fn test_pseudo_id_is_stable_and_ten_digits() {
        let first = pseudo_album_id(&album("In Rainbows"));
        let second = pseudo_album_id(&album("In Rainbows"));
        let other = pseudo_album_id(&album("The Bends"));

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.len(), 10);
        assert!(first.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_pseudo_id_used_when_no_identifier() {
        let deezer = service("deezer", vec![("album", DownloadKind::Album)]);
        let info = album("Pablo Honey");

        let url = album_url(Some(&deezer), &info);

        assert_eq!(url, format!("https://deezer.com/album/{}", pseudo_album_id(&info)));
    }

    #[test]
    fn test_unknown_service_degrades_to_comment() {
        let info = album("OK Computer: OKNOTOK!");

        assert_eq!(
            try_album_url(None, &info),
            Err(AlbumUrlError::UnknownService)
        );
        assert_eq!(album_url(None, &info), "# OK Computer OKNOTOK (1997) - Radiohead");
    }

    #[test]
    fn test_empty_netlocation_degrades_to_comment() {
        let broken = service("  ", vec![]);
        let mut info = album("Kid A");
        info.release_year = None;

        assert_eq!(album_url(Some(&broken), &info), "# Kid A (Unknown) - Radiohead");
    }
}

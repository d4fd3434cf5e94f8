use crate::catalog::{AlbumInfo, ServiceInfo};
use crate::selection::album_url::album_url;
use std::collections::BTreeSet;
use std::fmt;

/// Label used for fields that are unknown, e.g. for albums loaded from a links file.
pub const UNKNOWN: &str = "Unknown";

/// An album the user picked, or an entry loaded from a links file.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedAlbum {
    pub artist: String,
    pub album: String,
    pub year: String,
    pub module: String,
    pub info: Option<AlbumInfo>,
    pub url: Option<String>,
}

impl SelectedAlbum {
    /// Entry for a link read back from a file, where only the link is known.
    pub fn from_link(url: &str) -> Self {
        Self {
            artist: UNKNOWN.to_string(),
            album: UNKNOWN.to_string(),
            year: UNKNOWN.to_string(),
            module: UNKNOWN.to_string(),
            info: None,
            url: Some(url.to_string()),
        }
    }
}

/// Why a `remove` request was rejected. Nothing is removed in either case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveError {
    /// No album numbers were given.
    NoIndices,
    /// Tokens that are not numbers or fall outside the list, as typed.
    InvalidTokens(Vec<String>),
}

impl fmt::Display for RemoveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RemoveError::NoIndices => {
                write!(f, "Invalid format. Use 'remove [numbers]' (e.g., 'remove 1 3 5')")
            }
            RemoveError::InvalidTokens(tokens) => {
                write!(f, "Invalid album number(s): {}", tokens.join(", "))
            }
        }
    }
}

impl std::error::Error for RemoveError {}

/// Albums picked so far together with the link generated for each.
///
/// Both lists are private and only change through the methods below, which
/// always touch them together, so `albums()[i]` and `urls()[i]` belong to
/// the same album.
#[derive(Debug, Default)]
pub struct Selection {
    albums: Vec<SelectedAlbum>,
    urls: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    pub fn albums(&self) -> &[SelectedAlbum] {
        &self.albums
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Appends `albums` by `artist`, generating one link per album in order.
    pub fn add_albums(
        &mut self,
        service: Option<&ServiceInfo>,
        artist: &str,
        albums: &[AlbumInfo],
    ) -> &[SelectedAlbum] {
        let start = self.albums.len();
        let module = service
            .map(|s| s.module.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());

        for album in albums {
            self.urls.push(album_url(service, album));
            self.albums.push(SelectedAlbum {
                artist: artist.to_string(),
                album: album.name.clone(),
                year: album.year_label(),
                module: module.clone(),
                info: Some(album.clone()),
                url: None,
            });
        }

        &self.albums[start..]
    }

    /// Removes albums by their 1-based numbers.
    ///
    /// Every token is checked before anything is removed; a single bad token
    /// rejects the whole batch. Repeated numbers remove the album once.
    /// Returns the removed albums in list order.
    pub fn remove<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<Vec<SelectedAlbum>, RemoveError> {
        if tokens.is_empty() {
            return Err(RemoveError::NoIndices);
        }

        let mut indices = BTreeSet::new();
        let mut invalid = Vec::new();
        for token in tokens {
            let token = token.as_ref();
            match token.parse::<usize>() {
                Ok(number) if (1..=self.albums.len()).contains(&number) => {
                    indices.insert(number - 1);
                }
                _ => invalid.push(token.to_string()),
            }
        }

        if !invalid.is_empty() {
            return Err(RemoveError::InvalidTokens(invalid));
        }

        let mut removed: Vec<SelectedAlbum> = indices
            .into_iter()
            .rev()
            .map(|index| {
                self.urls.remove(index);
                self.albums.remove(index)
            })
            .collect();
        removed.reverse();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.albums.clear();
        self.urls.clear();
    }

    /// Appends links that are not selected yet; returns how many were added.
    pub fn merge_links<I, S>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for link in links {
            let link = link.as_ref();
            if self.urls.iter().any(|existing| existing == link) {
                continue;
            }
            self.urls.push(link.to_string());
            self.albums.push(SelectedAlbum::from_link(link));
            added += 1;
        }
        added
    }
}

/// Splits `remove 1 3 5` into its number tokens; `None` when it is not a remove command.
pub fn parse_remove_command(command: &str) -> Option<Vec<&str>> {
    let mut words = command.split_whitespace();
    match words.next() {
        Some(word) if word.eq_ignore_ascii_case("remove") => Some(words.collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DownloadKind;

    fn service() -> ServiceInfo {
        ServiceInfo {
            module: "subsonic".to_string(),
            service_name: "Subsonic".to_string(),
            netlocation: "subsonic".to_string(),
            url_routes: vec![("album".to_string(), DownloadKind::Album)],
            hidden: false,
        }
    }

    fn albums(names: &[&str]) -> Vec<AlbumInfo> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| AlbumInfo {
                name: name.to_string(),
                artist: "Radiohead".to_string(),
                release_year: Some(1993 + i as u32),
                album_id: Some(format!("al-{i}")),
                ..Default::default()
            })
            .collect()
    }

    fn selection_of(names: &[&str]) -> Selection {
        let mut selection = Selection::new();
        selection.add_albums(Some(&service()), "Radiohead", &albums(names));
        selection
    }

    fn assert_lockstep(selection: &Selection) {
        assert_eq!(selection.albums().len(), selection.urls().len());
    }

    #[test]
    fn test_add_albums_appends_records_and_urls() {
        let mut selection = Selection::new();
        let added = selection.add_albums(Some(&service()), "Radiohead", &albums(&["Pablo Honey", "The Bends"]));

        assert_eq!(added.len(), 2);
        assert_eq!(added[0].album, "Pablo Honey");
        assert_eq!(added[1].year, "1994");
        assert_eq!(added[1].module, "subsonic");
        assert_eq!(
            selection.urls(),
            &[
                "https://subsonic.com/album/al-0".to_string(),
                "https://subsonic.com/album/al-1".to_string()
            ]
        );
        assert_lockstep(&selection);
    }

    #[test]
    fn test_add_without_service_stores_placeholder() {
        let mut selection = Selection::new();
        selection.add_albums(None, "Radiohead", &albums(&["Kid A"]));

        assert_eq!(selection.albums()[0].module, UNKNOWN);
        assert_eq!(selection.urls()[0], "# Kid A (1993) - Radiohead");
    }

    #[test]
    fn test_remove_keeps_lists_in_lockstep() {
        let mut selection = selection_of(&["A", "B", "C", "D", "E"]);

        let removed = selection.remove(&["1", "3", "5"]).unwrap();

        assert_eq!(
            removed.iter().map(|a| a.album.as_str()).collect::<Vec<_>>(),
            vec!["A", "C", "E"]
        );
        assert_eq!(
            selection.albums().iter().map(|a| a.album.as_str()).collect::<Vec<_>>(),
            vec!["B", "D"]
        );
        assert_eq!(
            selection.urls(),
            &[
                "https://subsonic.com/album/al-1".to_string(),
                "https://subsonic.com/album/al-3".to_string()
            ]
        );
        assert_lockstep(&selection);
    }

    #[test]
    fn test_remove_with_invalid_token_removes_nothing() {
        let mut selection = selection_of(&["A", "B", "C"]);

        let err = selection.remove(&["1", "4", "x", "0", "2"]).unwrap_err();

        assert_eq!(
            err,
            RemoveError::InvalidTokens(vec!["4".to_string(), "x".to_string(), "0".to_string()])
        );
        assert_eq!(selection.len(), 3);
        assert_lockstep(&selection);
    }

    #[test]
    fn test_remove_duplicates_once() {
        let mut selection = selection_of(&["A", "B", "C"]);

        let removed = selection.remove(&["2", "2"]).unwrap();

        assert_eq!(removed.len(), 1);
        assert_eq!(selection.len(), 2);
        assert_lockstep(&selection);
    }

    #[test]
    fn test_remove_without_numbers() {
        let mut selection = selection_of(&["A"]);
        let empty: [&str; 0] = [];

        assert_eq!(selection.remove(&empty), Err(RemoveError::NoIndices));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_clear_empties_both_lists() {
        let mut selection = selection_of(&["A", "B"]);
        selection.clear();

        assert!(selection.is_empty());
        assert!(selection.urls().is_empty());
    }

    #[test]
    fn test_merge_links_is_idempotent() {
        let mut selection = selection_of(&["A"]);
        let links = vec![
            "https://play.qobuz.com/album/1".to_string(),
            "https://subsonic.com/album/al-0".to_string(),
            "https://play.qobuz.com/album/1".to_string(),
        ];

        assert_eq!(selection.merge_links(&links), 1);
        assert_eq!(selection.merge_links(&links), 0);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.albums()[1].artist, UNKNOWN);
        assert_eq!(
            selection.albums()[1].url.as_deref(),
            Some("https://play.qobuz.com/album/1")
        );
        assert_lockstep(&selection);
    }

    #[test]
    fn test_lockstep_across_mixed_operations() {
        let mut selection = Selection::new();
        selection.add_albums(Some(&service()), "Radiohead", &albums(&["A", "B", "C"]));
        assert_lockstep(&selection);
        selection.merge_links(["https://tidal.com/album/9"]);
        assert_lockstep(&selection);
        selection.remove(&["2", "4"]).unwrap();
        assert_lockstep(&selection);
        let _ = selection.remove(&["9"]);
        assert_lockstep(&selection);
        selection.add_albums(None, "Portishead", &albums(&["Dummy"]));
        assert_lockstep(&selection);
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn test_parse_remove_command() {
        assert_eq!(parse_remove_command("remove 1 3 5"), Some(vec!["1", "3", "5"]));
        assert_eq!(parse_remove_command("REMOVE  2"), Some(vec!["2"]));
        assert_eq!(parse_remove_command("remove"), Some(vec![]));
        assert_eq!(parse_remove_command("removeall"), None);
        assert_eq!(parse_remove_command("clear"), None);
    }
}

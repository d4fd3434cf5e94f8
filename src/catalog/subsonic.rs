//! Catalog backend speaking the Subsonic REST API (Navidrome, Airsonic, Gonic...).
//!
//! Requests carry the credentials as plain `u`/`p` query parameters and ask
//! for JSON responses. Every response is wrapped in a `subsonic-response`
//! object whose `error` member, when present, is surfaced as
//! [`CatalogError::ApiError`].
use crate::catalog::{
    AlbumInfo, ArtistInfo, Catalog, CatalogError, DownloadKind, SearchHit, ServiceInfo,
};
use crate::configuration::ModuleSettings;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;

const API_VERSION: &str = "1.16.1";
const CLIENT_NAME: &str = "albumlinks";

/// Album record fields mapped onto [`AlbumInfo`]; everything else lands in `extra`.
const KNOWN_ALBUM_FIELDS: [&str; 7] = [
    "id", "name", "artist", "year", "duration", "explicitStatus", "song",
];

pub struct SubsonicCatalog {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    service: ServiceInfo,
}

impl SubsonicCatalog {
    pub fn new(module: &str, base_url: &str, username: &str, password: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            service: ServiceInfo {
                module: module.to_string(),
                service_name: "Subsonic".to_string(),
                netlocation: "subsonic".to_string(),
                url_routes: vec![
                    ("album".to_string(), DownloadKind::Album),
                    ("artist".to_string(), DownloadKind::Artist),
                    ("track".to_string(), DownloadKind::Track),
                    ("playlist".to_string(), DownloadKind::Playlist),
                ],
                hidden: false,
            },
        }
    }

    /// Builds a catalog from a settings section; `base_url`, `username` and `password` are required.
    pub fn from_settings(module: &str, settings: &ModuleSettings) -> Result<Self, CatalogError> {
        let required = |value: &Option<String>, key: &str| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
                .ok_or_else(|| CatalogError::Other(format!("'{module}' is missing '{key}'")))
        };

        let base_url = required(&settings.base_url, "base_url")?;
        let username = required(&settings.username, "username")?;
        let password = required(&settings.password, "password")?;

        let mut catalog = Self::new(module, &base_url, &username, &password);
        if let Some(name) = &settings.service_name {
            catalog.service.service_name = name.clone();
        }
        if let Some(netlocation) = &settings.netlocation {
            catalog.service.netlocation = netlocation.clone();
        }
        catalog.service.hidden = settings.hidden;
        Ok(catalog)
    }

    /// Issues `GET {base_url}/{endpoint}` and returns the unwrapped `subsonic-response` body.
    async fn call(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, CatalogError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut query: Vec<(&str, String)> = vec![
            ("u", self.username.clone()),
            ("p", self.password.clone()),
            ("v", API_VERSION.to_string()),
            ("c", CLIENT_NAME.to_string()),
            ("f", "json".to_string()),
        ];
        query.extend(params.iter().cloned());

        tracing::debug!(endpoint, "subsonic request");
        let text = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await?
            .text()
            .await?;

        decode_response(&text)
    }
}

/// Parses a raw response body and unwraps its `subsonic-response` envelope.
fn decode_response(text: &str) -> Result<Value, CatalogError> {
    let response: Value = serde_json::from_str(text)?;
    unwrap_response(response)
}

fn unwrap_response(mut response: Value) -> Result<Value, CatalogError> {
    let body = response["subsonic-response"].take();
    if body.is_null() {
        return Err(CatalogError::Other(
            "response is missing 'subsonic-response'".to_string(),
        ));
    }

    if let Some(error) = body["error"].as_object() {
        return Err(CatalogError::ApiError {
            code: error
                .get("code")
                .and_then(Value::as_i64)
                .unwrap_or(0) as i32,
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string(),
        });
    }

    Ok(body)
}

/// Reads an identifier that servers emit either as a string or a number.
fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_search(body: &Value) -> Vec<SearchHit> {
    body["searchResult3"]["artist"]
        .as_array()
        .map(|artists| {
            artists
                .iter()
                .filter_map(|artist| {
                    let result_id = id_of(&artist["id"])?;
                    let name = artist["name"].as_str()?.to_string();
                    let additional = artist["albumCount"]
                        .as_u64()
                        .map(|count| vec![format!("{count} albums")])
                        .unwrap_or_default();
                    Some(SearchHit {
                        result_id,
                        name,
                        year: None,
                        additional,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_artist(body: &Value) -> Result<ArtistInfo, CatalogError> {
    let artist = &body["artist"];
    let name = artist["name"]
        .as_str()
        .ok_or_else(|| CatalogError::NotFound("artist".to_string()))?
        .to_string();

    let albums = artist["album"]
        .as_array()
        .map(|albums| albums.iter().filter_map(|album| id_of(&album["id"])).collect())
        .unwrap_or_default();

    Ok(ArtistInfo { name, albums })
}

fn parse_album(body: &Value, requested_id: &str) -> Result<AlbumInfo, CatalogError> {
    let album = body["album"]
        .as_object()
        .ok_or_else(|| CatalogError::NotFound(format!("album {requested_id}")))?;

    let extra: BTreeMap<String, Value> = album
        .iter()
        .filter(|(key, _)| !KNOWN_ALBUM_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(AlbumInfo {
        name: album
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        artist: album
            .get("artist")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        release_year: album
            .get("year")
            .and_then(Value::as_u64)
            .and_then(|year| u32::try_from(year).ok()),
        duration: album.get("duration").and_then(Value::as_u64),
        explicit: album.get("explicitStatus").and_then(Value::as_str) == Some("explicit"),
        quality: None,
        album_id: Some(requested_id.to_string()),
        id: album.get("id").and_then(id_of),
        extra,
    })
}

#[async_trait]
impl Catalog for SubsonicCatalog {
    fn service(&self) -> &ServiceInfo {
        &self.service
    }

    async fn search_artists(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, CatalogError> {
        let body = self
            .call(
                "search3",
                &[
                    ("query", query.to_string()),
                    ("artistCount", limit.to_string()),
                    ("albumCount", "0".to_string()),
                    ("songCount", "0".to_string()),
                ],
            )
            .await?;

        Ok(parse_search(&body))
    }

    async fn artist(&self, artist_id: &str) -> Result<ArtistInfo, CatalogError> {
        let body = self
            .call("getArtist", &[("id", artist_id.to_string())])
            .await?;
        parse_artist(&body)
    }

    async fn album(&self, album_id: &str) -> Result<AlbumInfo, CatalogError> {
        let body = self
            .call("getAlbum", &[("id", album_id.to_string())])
            .await?;
        parse_album(&body, album_id)
    }
}

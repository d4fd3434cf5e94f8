use crate::catalog::subsonic::SubsonicCatalog;
use crate::catalog::{AlbumInfo, ArtistInfo, CatalogError, SearchHit, ServiceInfo};
use crate::configuration::Settings;
use async_trait::async_trait;

/// Number of artists requested per search.
pub const SEARCH_LIMIT: usize = 10;

/// The narrow slice of a music service the album selectors need.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Description of the module backing this catalog.
    fn service(&self) -> &ServiceInfo;

    async fn search_artists(&self, query: &str, limit: usize)
        -> Result<Vec<SearchHit>, CatalogError>;

    async fn artist(&self, artist_id: &str) -> Result<ArtistInfo, CatalogError>;

    async fn album(&self, album_id: &str) -> Result<AlbumInfo, CatalogError>;
}

/// Builds one catalog per configured module that has a known backend.
///
/// Hidden modules are left out unless every usable module is hidden, in
/// which case all of them are offered.
pub fn catalogs_from_settings(settings: &Settings) -> Vec<Box<dyn Catalog>> {
    let mut visible: Vec<Box<dyn Catalog>> = Vec::new();
    let mut hidden: Vec<Box<dyn Catalog>> = Vec::new();

    for (module, module_settings) in &settings.modules {
        let catalog: Box<dyn Catalog> = match module_settings.backend_for(module) {
            "subsonic" => match SubsonicCatalog::from_settings(module, module_settings) {
                Ok(catalog) => Box::new(catalog),
                Err(e) => {
                    tracing::warn!(module = %module, error = %e, "skipping misconfigured module");
                    continue;
                }
            },
            other => {
                tracing::debug!(module = %module, backend = other, "no catalog backend for module");
                continue;
            }
        };

        if catalog.service().hidden {
            hidden.push(catalog);
        } else {
            visible.push(catalog);
        }
    }

    if visible.is_empty() {
        hidden
    } else {
        visible
    }
}

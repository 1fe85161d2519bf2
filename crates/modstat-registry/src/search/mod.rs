//! Author package discovery through the registry search endpoint

use tracing::debug;
use url::Url;

use modstat_core::error::ModstatError;
use crate::api::SearchResponse;
use crate::client::RegistryClient;
use crate::RegistryResult;

/// Largest page size the search endpoint accepts
pub const SEARCH_PAGE_SIZE: usize = 250;

impl RegistryClient {
    /// Search URL for one page of an author's packages
    pub fn author_search_url(&self, author: &str, from: usize) -> RegistryResult<Url> {
        let base = format!("{}/-/v1/search", self.base_url());
        Url::parse_with_params(
            &base,
            &[
                ("size", SEARCH_PAGE_SIZE.to_string()),
                ("text", format!("author:{}", author)),
                ("from", from.to_string()),
            ],
        )
        .map_err(|e| ModstatError::ConfigValidation {
            field: "registry".to_string(),
            reason: format!("Invalid search URL {}: {}", base, e),
        })
    }

    /// Names of every package published by `author`, following all result pages
    pub async fn author_packages(&self, author: &str) -> RegistryResult<Vec<String>> {
        let mut names = Vec::new();
        let mut from = 0;

        loop {
            let url = self.author_search_url(author, from)?;
            let page: SearchResponse = self.fetch_json(url.as_str()).await?;
            if page.objects.is_empty() {
                break;
            }

            from += page.objects.len();
            names.extend(page.objects.into_iter().map(|object| object.package.name));
            debug!("found {} packages for {} so far", names.len(), author);

            if page.total.is_some_and(|total| from as u64 >= total) {
                break;
            }
        }

        Ok(names)
    }
}

//! Bulk retrieval across the service's page-size limit.

use crate::{
    client::LandaxClient,
    error::LandaxResult,
    models::Record,
    query::QueryParams,
};
use log::{debug, info};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Most records the service returns for one request
pub const MAX_PAGE_SIZE: usize = 1000;

/// How a client walks a collection larger than one page.
/// A client applies the same strategy to every bulk fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagingStrategy {
    /// `$top=<page size>` then `$skip=<n * page size>` until a short page
    #[default]
    Offset,
    /// Follow `@odata.nextLink` until the envelope has none
    NextLink,
}

/// Listing envelope of API v20
#[derive(Debug, Deserialize)]
pub(crate) struct Page {
    pub value: Vec<Record>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

pub(crate) struct Paginator<'a> {
    client: &'a LandaxClient,
    collection: &'a str,
    params: QueryParams,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a LandaxClient, collection: &'a str, params: QueryParams) -> Self {
        Self {
            client,
            collection,
            params: params.without_paging("fetch_all"),
        }
    }

    /// Every record of the collection, in the order the server returned them
    pub async fn fetch_all(self) -> LandaxResult<Vec<Record>> {
        let records = match self.client.paging() {
            PagingStrategy::Offset => self.by_offset().await?,
            PagingStrategy::NextLink => self.by_next_link().await?,
        };
        info!("Fetched {} records from {}", records.len(), self.collection);
        Ok(records)
    }

    async fn fetch_page(&self, url: &str) -> LandaxResult<Page> {
        let req = self.client.request(Method::GET, url);
        self.client.execute(req).await
    }

    async fn by_offset(&self) -> LandaxResult<Vec<Record>> {
        let page_size = self.client.page_size();
        let first = self.params.clone().top(page_size);
        let mut records = Vec::new();
        let mut pages = 0;

        loop {
            let params = match pages {
                0 => first.clone(),
                n => first.clone().skip(n * page_size),
            };
            let url = self.client.url(self.collection, &params)?;
            let page = self.fetch_page(&url).await?;
            let count = page.value.len();
            debug!("Page {} of {}: {} records", pages + 1, self.collection, count);

            records.extend(page.value);
            pages += 1;

            if count < page_size {
                return Ok(records);
            }
        }
    }

    async fn by_next_link(&self) -> LandaxResult<Vec<Record>> {
        let mut url = self.client.url(self.collection, &self.params)?;
        let mut records = Vec::new();

        loop {
            let page = self.fetch_page(&url).await?;
            debug!(
                "Page of {}: {} records, next link: {}",
                self.collection,
                page.value.len(),
                page.next_link.is_some()
            );
            records.extend(page.value);

            match page.next_link {
                // relative links resolve against the api root
                Some(link) => url = self.client.session().api_url().join(&link)?.to_string(),
                None => return Ok(records),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_envelope_reads_next_link() {
        let page: Page = serde_json::from_str(
            r#"{"value": [{"Id": 1}], "@odata.nextLink": "Contacts?$skiptoken=1"}"#,
        )
        .unwrap();
        assert_eq!(page.value.len(), 1);
        assert_eq!(page.next_link.as_deref(), Some("Contacts?$skiptoken=1"));
    }

    #[test]
    fn page_without_next_link_is_last() {
        let page: Page = serde_json::from_str(r#"{"value": []}"#).unwrap();
        assert!(page.value.is_empty());
        assert!(page.next_link.is_none());
    }

    #[test]
    fn envelope_without_value_is_rejected() {
        assert!(serde_json::from_str::<Page>(r#"{"d": {"results": []}}"#).is_err());
    }

    #[test]
    fn strategy_names() {
        assert_eq!(
            serde_json::from_str::<PagingStrategy>(r#""offset""#).unwrap(),
            PagingStrategy::Offset
        );
        assert_eq!(PagingStrategy::default(), PagingStrategy::Offset);
    }
}

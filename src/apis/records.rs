use crate::{
    client::LandaxClient,
    error::LandaxResult,
    models::{Record, RecordId},
    pagination::Paginator,
    query::{resource_path, QueryParams},
};
use log::{debug, info};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;

/// Record API operations
pub struct RecordApi<'a> {
    client: &'a LandaxClient,
}

impl<'a> RecordApi<'a> {
    pub fn new(client: &'a LandaxClient) -> Self {
        Self { client }
    }

    /// Get a single record, or `None` if the service has no such record
    ///
    /// # Arguments
    /// * `collection` - Data model, e.g. `Contacts`
    /// * `id` - Record Id
    /// * `params` - Query parameters such as `$select` or `$expand`
    pub async fn get_one(
        &self,
        collection: &str,
        id: RecordId,
        params: &QueryParams,
    ) -> LandaxResult<Option<Record>> {
        info!("Getting {}({})", collection, id);
        let url = self.client.url(&resource_path(collection, Some(id)), params)?;
        let req = self.client.request(Method::GET, &url);
        let response = self.client.send(req).await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("{}({}) not found", collection, id);
            return Ok(None);
        }

        self.client.handle_response(response).await.map(Some)
    }

    /// Get every record of a collection, across as many pages as needed
    ///
    /// `$top` and `$skip` in `params` are dropped with a warning.
    pub async fn get_all(&self, collection: &str, params: QueryParams) -> LandaxResult<Vec<Record>> {
        self.fetch_all(collection, params, None).await
    }

    /// Like [`get_all`](Self::get_all), restricted to the `select` fields
    pub async fn fetch_all(
        &self,
        collection: &str,
        params: QueryParams,
        select: Option<&[&str]>,
    ) -> LandaxResult<Vec<Record>> {
        info!("Getting all records of {}", collection);
        let params = match select {
            Some(fields) => params.select(fields),
            None => params,
        };

        Paginator::new(self.client, collection, params)
            .fetch_all()
            .await
    }

    /// Create a record. The raw response is returned whatever its status;
    /// the service answers 201 on success.
    pub async fn create<T>(&self, collection: &str, record: &T) -> LandaxResult<Response>
    where
        T: Serialize + ?Sized,
    {
        info!("Creating record in {}", collection);
        let url = self.client.url(&resource_path(collection, None), &QueryParams::new())?;
        let req = self.client.json_request(Method::POST, &url, record)?;

        self.client.send(req).await
    }

    /// Patch fields of a record; returns the raw response
    pub async fn update<T>(&self, collection: &str, id: RecordId, partial: &T) -> LandaxResult<Response>
    where
        T: Serialize + ?Sized,
    {
        info!("Updating {}({})", collection, id);
        let url = self.client.url(&resource_path(collection, Some(id)), &QueryParams::new())?;
        let req = self.client.json_request(Method::PATCH, &url, partial)?;

        self.client.send(req).await
    }

    /// Delete a record; `None` if the service has no such record
    pub async fn delete(&self, collection: &str, id: RecordId) -> LandaxResult<Option<Response>> {
        info!("Deleting {}({})", collection, id);
        let params = QueryParams::new().param("$format", "json");
        let url = self.client.url(&resource_path(collection, Some(id)), &params)?;
        let req = self.client.request(Method::DELETE, &url);
        let response = self.client.send(req).await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("{}({}) not found", collection, id);
            return Ok(None);
        }
        Ok(Some(response))
    }
}

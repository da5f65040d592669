//! Repository over the shop's REST API.
//!
//! Collection URL is `{base_url}/{family path}`; items live under
//! `{collection}/{id}`. Every response uses the `{ success, data, message }`
//! envelope.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::errors::ConsoleError;
use crate::repository::{ListParams, RepoResponse, Repository};
use crate::services::resource::{Resource, ResourceId};

/// HTTP-backed repository for one resource family.
pub struct HttpRepository<T: Resource> {
    http: Client,
    base_url: String,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Resource> HttpRepository<T> {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            _phantom: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, T::FAMILY.path())
    }

    fn item_url(&self, id: ResourceId) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    fn list_url(&self, params: &ListParams) -> Result<Url, ConsoleError> {
        let mut url = Url::parse(&self.collection_url())
            .map_err(|e| ConsoleError::Repository(format!("Invalid API URL: {e}")))?;
        if let Some(term) = &params.search {
            url.query_pairs_mut().append_pair("search", term);
        }
        Ok(url)
    }

    /// Send a request and unwrap the envelope.
    async fn send<D: DeserializeOwned>(request: RequestBuilder) -> Result<Option<D>, ConsoleError> {
        let resp = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Upstream request failed");
            ConsoleError::Repository(format!("Network error: {e}"))
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ConsoleError::Repository(format!("Network error: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<RepoResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()));
            tracing::warn!(status = status.as_u16(), "Upstream rejected request");
            return Err(ConsoleError::repository(message));
        }

        let envelope: RepoResponse<D> = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, "Undecodable upstream response");
            ConsoleError::Repository(format!("Unexpected response from the shop API: {e}"))
        })?;
        envelope.into_result()
    }
}

#[async_trait]
impl<T: Resource> Repository<T> for HttpRepository<T> {
    async fn get_list(&self, params: &ListParams) -> Result<Vec<T>, ConsoleError> {
        let url = self.list_url(params)?;
        let rows: Option<Vec<T>> = Self::send(self.http.get(url)).await?;
        Ok(rows.unwrap_or_default())
    }

    async fn create(&self, draft: &T::Draft) -> Result<Option<T>, ConsoleError> {
        Self::send(self.http.post(self.collection_url()).json(draft)).await
    }

    async fn update(&self, id: ResourceId, draft: &T::Draft) -> Result<Option<T>, ConsoleError> {
        Self::send(self.http.put(self.item_url(id)).json(draft)).await
    }

    async fn delete(&self, id: ResourceId) -> Result<(), ConsoleError> {
        Self::send::<serde_json::Value>(self.http.delete(self.item_url(id)))
            .await
            .map(|_| ())
    }

    async fn change_status(&self, id: ResourceId, status: i64) -> Result<(), ConsoleError> {
        if !T::descriptor().status_change {
            return Err(ConsoleError::Unsupported(format!(
                "{} rows have no persisted status",
                T::FAMILY.noun()
            )));
        }
        let url = format!("{}/status", self.item_url(id));
        let body = serde_json::json!({ "StatusID": status });
        Self::send::<serde_json::Value>(self.http.patch(url).json(&body))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::Account;
    use crate::models::discount::DiscountEvent;

    #[test]
    fn urls_follow_family_paths() {
        let repo = HttpRepository::<DiscountEvent>::new(Client::new(), "http://shop.test/api/");
        assert_eq!(repo.collection_url(), "http://shop.test/api/discount-events");
        assert_eq!(repo.item_url(12), "http://shop.test/api/discount-events/12");
    }

    #[test]
    fn search_term_is_encoded() {
        let repo = HttpRepository::<Account>::new(Client::new(), "http://shop.test/api");
        let url = repo.list_url(&ListParams::search("anna weiss")).unwrap();
        assert_eq!(url.as_str(), "http://shop.test/api/accounts?search=anna+weiss");
        let url = repo.list_url(&ListParams::all()).unwrap();
        assert_eq!(url.query(), None);
    }

    #[tokio::test]
    async fn status_change_unsupported_without_persisted_status() {
        let repo = HttpRepository::<DiscountEvent>::new(Client::new(), "http://127.0.0.1:9");
        let err = repo.change_status(1, 2).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Unsupported(_)));
    }
}

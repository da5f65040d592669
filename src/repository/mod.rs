//! Repository boundary: the REST collections behind each admin page.

pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;
use crate::models::account::Account;
use crate::models::category::Category;
use crate::models::discount::{DiscountEvent, DiscountOrder, DiscountProduct};
use crate::models::inventory::InventoryProduct;
use crate::services::resource::{Resource, ResourceId};

pub use http::HttpRepository;
pub use memory::InMemoryRepository;

/// Query sent with a list fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListParams {
    /// Upstream search term; `None` lists everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListParams {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
        }
    }
}

/// Upstream response envelope: `{ success, data?, message? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoResponse<D> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<D>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<D> RepoResponse<D> {
    /// `success: false` becomes a repository error carrying the message.
    pub fn into_result(self) -> Result<Option<D>, ConsoleError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ConsoleError::repository(self.message))
        }
    }
}

/// CRUD access to one resource collection.
///
/// `Err(ConsoleError::Repository(_))` is a recoverable, user-facing failure.
#[async_trait]
pub trait Repository<T: Resource>: Send + Sync {
    async fn get_list(&self, params: &ListParams) -> Result<Vec<T>, ConsoleError>;

    async fn create(&self, draft: &T::Draft) -> Result<Option<T>, ConsoleError>;

    async fn update(&self, id: ResourceId, draft: &T::Draft) -> Result<Option<T>, ConsoleError>;

    async fn delete(&self, id: ResourceId) -> Result<(), ConsoleError>;

    /// Only collections with a persisted status field support this.
    async fn change_status(&self, _id: ResourceId, _status: i64) -> Result<(), ConsoleError> {
        Err(ConsoleError::Unsupported(format!(
            "{} rows have no persisted status",
            T::FAMILY.noun()
        )))
    }
}

/// One repository per admin resource family.
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn Repository<Account>>,
    pub discount_events: Arc<dyn Repository<DiscountEvent>>,
    pub discount_products: Arc<dyn Repository<DiscountProduct>>,
    pub discount_orders: Arc<dyn Repository<DiscountOrder>>,
    pub categories: Arc<dyn Repository<Category>>,
    pub products: Arc<dyn Repository<InventoryProduct>>,
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

impl Repositories {
    /// Repositories backed by the upstream REST API.
    pub fn http(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            accounts: Arc::new(HttpRepository::<Account>::new(client.clone(), base_url)),
            discount_events: Arc::new(HttpRepository::<DiscountEvent>::new(client.clone(), base_url)),
            discount_products: Arc::new(HttpRepository::<DiscountProduct>::new(client.clone(), base_url)),
            discount_orders: Arc::new(HttpRepository::<DiscountOrder>::new(client.clone(), base_url)),
            categories: Arc::new(HttpRepository::<Category>::new(client.clone(), base_url)),
            products: Arc::new(HttpRepository::<InventoryProduct>::new(client, base_url)),
        }
    }

    /// Empty in-process repositories.
    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(InMemoryRepository::<Account>::new()),
            discount_events: Arc::new(InMemoryRepository::<DiscountEvent>::new()),
            discount_products: Arc::new(InMemoryRepository::<DiscountProduct>::new()),
            discount_orders: Arc::new(InMemoryRepository::<DiscountOrder>::new()),
            categories: Arc::new(InMemoryRepository::<Category>::new()),
            products: Arc::new(InMemoryRepository::<InventoryProduct>::new()),
        }
    }
}

/// Typed lookup of the repository serving `T`.
pub trait HasRepository<T: Resource> {
    fn repository(&self) -> Arc<dyn Repository<T>>;
}

macro_rules! has_repository {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(
            impl HasRepository<$ty> for Repositories {
                fn repository(&self) -> Arc<dyn Repository<$ty>> {
                    Arc::clone(&self.$field)
                }
            }
        )*
    };
}

has_repository! {
    Account => accounts,
    DiscountEvent => discount_events,
    DiscountProduct => discount_products,
    DiscountOrder => discount_orders,
    Category => categories,
    InventoryProduct => products,
}

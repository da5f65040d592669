//! Route definitions for the console gateway.

pub mod health;
pub mod resources;

use axum::http::HeaderValue;
use axum::routing::{get, patch, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::models::account::Account;
use crate::models::category::Category;
use crate::models::discount::{DiscountEvent, DiscountOrder, DiscountProduct};
use crate::models::inventory::InventoryProduct;
use crate::repository::{HasRepository, Repositories};
use crate::services::resource::Resource;
use crate::AppState;

/// Collection and item routes for one resource family.
fn resource_routes<T>() -> Router<AppState>
where
    T: Resource,
    Repositories: HasRepository<T>,
{
    let collection = format!("/{}", T::FAMILY.path());
    let item = format!("{collection}/{{id}}");
    Router::new()
        .route(
            &collection,
            get(resources::list::<T>).post(resources::create::<T>),
        )
        .route(
            &item,
            put(resources::update::<T>).delete(resources::delete::<T>),
        )
}

/// Allow the console frontend origin only. An unparseable origin allows none.
fn cors_layer(frontend_url: &str) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin([origin]),
        Err(_) => {
            tracing::warn!(frontend_url, "FRONTEND_URL is not a valid origin, CORS disabled");
            cors
        }
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.frontend_url);

    let api_routes = Router::new()
        .merge(resource_routes::<Account>())
        .route(
            "/accounts/{id}/status",
            patch(resources::change_status::<Account>),
        )
        .merge(resource_routes::<DiscountEvent>())
        .merge(resource_routes::<DiscountProduct>())
        .merge(resource_routes::<DiscountOrder>())
        .merge(resource_routes::<Category>())
        .merge(resource_routes::<InventoryProduct>());

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

//! Generic list-page routes, mounted once per resource family.
//!
//! Every request builds a fresh [`ListController`] from the query string, so
//! the gateway holds no page state between calls. Mutations answer with the
//! list as reloaded after the change.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::{ApiResponse, ConsoleError};
use crate::middleware::rbac::CurrentRole;
use crate::models::account::RoleId;
use crate::models::pagination::Pagination;
use crate::repository::{HasRepository, Repositories};
use crate::services::filter::FilterSet;
use crate::services::list_controller::{ListController, ListView, LoadingState, PageState};
use crate::services::permissions::capabilities_for;
use crate::services::resource::{Resource, ResourceId};
use crate::AppState;

type ViewResponse<T> = Result<Json<ApiResponse<ListView<T>>>, ConsoleError>;

/// Body of `PATCH /{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    #[serde(rename = "StatusID")]
    pub status_id: i64,
}

fn open<T>(
    state: &AppState,
    role: Option<RoleId>,
    pagination: &Pagination,
    params: &HashMap<String, String>,
) -> Result<ListController<T>, ConsoleError>
where
    T: Resource,
    Repositories: HasRepository<T>,
{
    let settings = state.config.list_settings();
    let page = PageState {
        search_term: params.get("search").cloned().unwrap_or_default(),
        filters: FilterSet::from_params(&T::descriptor(), params)?,
        current_page: pagination.current_page(),
        items_per_page: pagination.limit(settings.default_page_size),
    };
    let capabilities = capabilities_for(state.permissions.as_ref(), T::FAMILY, role);
    Ok(ListController::new(
        HasRepository::<T>::repository(&state.repositories),
        capabilities,
        state.clock.clone(),
        settings,
    )
    .with_state(page))
}

/// Load the list before an id-targeted mutation; the target must be known.
async fn loaded<T: Resource>(controller: &mut ListController<T>) -> Result<(), ConsoleError> {
    controller.reload().await;
    match (controller.loading_state(), controller.last_error()) {
        (LoadingState::Failed, Some(e)) => Err(e.clone()),
        _ => Ok(()),
    }
}

/// GET /api/v1/{family}: one page of the filtered list.
pub async fn list<T>(
    State(state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Query(pagination): Query<Pagination>,
    Query(params): Query<HashMap<String, String>>,
) -> ViewResponse<T>
where
    T: Resource,
    Repositories: HasRepository<T>,
{
    let mut controller = open::<T>(&state, role, &pagination, &params)?;
    loaded(&mut controller).await?;
    Ok(ApiResponse::success(controller.view()))
}

/// POST /api/v1/{family}
pub async fn create<T>(
    State(state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Query(pagination): Query<Pagination>,
    Query(params): Query<HashMap<String, String>>,
    Json(draft): Json<T::Draft>,
) -> ViewResponse<T>
where
    T: Resource,
    Repositories: HasRepository<T>,
{
    let mut controller = open::<T>(&state, role, &pagination, &params)?;
    controller.create(&draft).await?;
    Ok(ApiResponse::success(controller.view()))
}

/// PUT /api/v1/{family}/{id}
pub async fn update<T>(
    State(state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Path(id): Path<ResourceId>,
    Query(pagination): Query<Pagination>,
    Query(params): Query<HashMap<String, String>>,
    Json(draft): Json<T::Draft>,
) -> ViewResponse<T>
where
    T: Resource,
    Repositories: HasRepository<T>,
{
    let mut controller = open::<T>(&state, role, &pagination, &params)?;
    loaded(&mut controller).await?;
    controller.update(id, &draft).await?;
    Ok(ApiResponse::success(controller.view()))
}

/// DELETE /api/v1/{family}/{id}
pub async fn delete<T>(
    State(state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Path(id): Path<ResourceId>,
    Query(pagination): Query<Pagination>,
    Query(params): Query<HashMap<String, String>>,
) -> ViewResponse<T>
where
    T: Resource,
    Repositories: HasRepository<T>,
{
    let mut controller = open::<T>(&state, role, &pagination, &params)?;
    loaded(&mut controller).await?;
    controller.delete(id).await?;
    Ok(ApiResponse::success(controller.view()))
}

/// PATCH /api/v1/{family}/{id}/status
pub async fn change_status<T>(
    State(state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Path(id): Path<ResourceId>,
    Query(pagination): Query<Pagination>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<StatusChange>,
) -> ViewResponse<T>
where
    T: Resource,
    Repositories: HasRepository<T>,
{
    let mut controller = open::<T>(&state, role, &pagination, &params)?;
    loaded(&mut controller).await?;
    controller.change_status(id, body.status_id).await?;
    Ok(ApiResponse::success(controller.view()))
}

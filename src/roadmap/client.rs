//! Roadmap endpoints. Public listing needs no session; the admin endpoints need a
//! staff session cookie in the client's cookie store.

use super::{
    RoadmapError,
    types::{NewRoadmapItem, RoadmapItem, RoadmapPatch},
};
use crate::api::{ApiClient, Payload};
use reqwest::Method;
use tracing::{info, instrument};

pub const PUBLIC_PATH: &str = "/api/roadmap/";
pub const ADMIN_PATH: &str = "/api/roadmap/admin/";

fn admin_item_path(id: i64) -> String {
    format!("{ADMIN_PATH}{id}/")
}

/// # Errors
/// Returns `RoadmapError::Api` on transport failures or non-2xx responses.
#[instrument(skip(client))]
pub async fn list(client: &ApiClient) -> Result<Vec<RoadmapItem>, RoadmapError> {
    Ok(client.get_json(PUBLIC_PATH).await?)
}

/// # Errors
/// Returns `RoadmapError::Api` on transport failures or non-2xx responses.
#[instrument(skip(client))]
pub async fn list_admin(client: &ApiClient) -> Result<Vec<RoadmapItem>, RoadmapError> {
    Ok(client.get_json(ADMIN_PATH).await?)
}

/// Validates `item` locally, then creates it.
///
/// # Errors
/// Returns a validation error without a request, or `RoadmapError::Api`.
#[instrument(skip(client, item))]
pub async fn create(
    client: &ApiClient,
    item: &NewRoadmapItem,
) -> Result<RoadmapItem, RoadmapError> {
    item.validate()?;
    let created: RoadmapItem = client.post_json(ADMIN_PATH, item).await?;
    info!(id = created.id, "roadmap item created");
    Ok(created)
}

/// Validates the set fields of `patch` locally, then applies it.
///
/// # Errors
/// Returns a validation error without a request, or `RoadmapError::Api`.
#[instrument(skip(client, patch))]
pub async fn update(
    client: &ApiClient,
    id: i64,
    patch: &RoadmapPatch,
) -> Result<RoadmapItem, RoadmapError> {
    patch.validate()?;
    let updated: RoadmapItem = client
        .request_json(Method::PATCH, &admin_item_path(id), Payload::json(patch)?)
        .await?;
    info!(id, "roadmap item updated");
    Ok(updated)
}

/// # Errors
/// Returns `RoadmapError::Api` on transport failures or non-2xx responses.
#[instrument(skip(client))]
pub async fn delete(client: &ApiClient, id: i64) -> Result<(), RoadmapError> {
    client
        .request_empty(Method::DELETE, &admin_item_path(id), Payload::Empty)
        .await?;
    info!(id, "roadmap item deleted");
    Ok(())
}

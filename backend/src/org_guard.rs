//! Org-boundary validation helpers.
//!
//! Every function checks that a resource exists and belongs to the given
//! organization and returns `AppError::NotFound` if it doesn't (we don't
//! reveal that the resource exists in another org).

use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::organization::{Location, Organization},
    repository::PlanningRepository,
};

pub async fn verify_organization(repo: &dyn PlanningRepository, org_id: Uuid) -> Result<Organization> {
    repo.find_organization(org_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".into()))
}

pub async fn verify_location(
    repo: &dyn PlanningRepository,
    location_id: Uuid,
    org_id: Uuid,
) -> Result<Location> {
    repo.find_location(location_id)
        .await?
        .filter(|l| l.org_id == org_id)
        .ok_or_else(|| AppError::NotFound("Location not found".into()))
}

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::architecture::FloorSpec;
use super::domain::{Hostel, HostelId, OccupancySummary, RoomNumber};
use super::error::InventoryError;
use super::repository::{HostelRepository, RepositoryError, ResidentRepository};
use super::residents::{Resident, ResidentId, ResidentSubmission};
use super::service::{Discharge, HostelRegistration, InventoryService, InventoryServiceError};

/// Hostel payload with its derived occupancy numbers.
#[derive(Debug, Clone, Serialize)]
pub struct HostelView {
    #[serde(flatten)]
    pub hostel: Hostel,
    pub summary: OccupancySummary,
}

impl From<Hostel> for HostelView {
    fn from(hostel: Hostel) -> Self {
        let summary = hostel.summary();
        Self { hostel, summary }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchitectureRequest {
    pub floors: Vec<FloorSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelocationRequest {
    pub room: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRequest {
    pub first: String,
    pub second: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemovalView {
    pub resident: Resident,
    pub discharge: Discharge,
}

/// Router builder exposing the warden-facing inventory endpoints.
pub fn inventory_router<H, R>(service: Arc<InventoryService<H, R>>) -> Router
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    Router::new()
        .route("/api/v1/hostels", post(register_handler::<H, R>))
        .route("/api/v1/hostels/:hostel_id", get(hostel_handler::<H, R>))
        .route(
            "/api/v1/hostels/:hostel_id/architecture",
            put(architecture_handler::<H, R>),
        )
        .route(
            "/api/v1/hostels/:hostel_id/residents",
            get(list_residents_handler::<H, R>).post(assign_handler::<H, R>),
        )
        .route(
            "/api/v1/residents/:resident_id",
            get(resident_handler::<H, R>).delete(remove_handler::<H, R>),
        )
        .route(
            "/api/v1/residents/:resident_id/room",
            put(relocate_handler::<H, R>),
        )
        .route("/api/v1/room-exchanges", post(exchange_handler::<H, R>))
        .with_state(service)
}

pub(crate) async fn register_handler<H, R>(
    State(service): State<Arc<InventoryService<H, R>>>,
    payload: Result<Json<HostelRegistration>, JsonRejection>,
) -> Response
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    let Json(registration) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.register_hostel(registration) {
        Ok(hostel) => (StatusCode::CREATED, Json(HostelView::from(hostel))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn hostel_handler<H, R>(
    State(service): State<Arc<InventoryService<H, R>>>,
    Path(hostel_id): Path<String>,
) -> Response
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    match service.hostel(&HostelId(hostel_id)) {
        Ok(hostel) => (StatusCode::OK, Json(HostelView::from(hostel))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn architecture_handler<H, R>(
    State(service): State<Arc<InventoryService<H, R>>>,
    Path(hostel_id): Path<String>,
    payload: Result<Json<ArchitectureRequest>, JsonRejection>,
) -> Response
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    match service
        .define_architecture(&HostelId(hostel_id), request.floors)
        .await
    {
        Ok(hostel) => (StatusCode::OK, Json(HostelView::from(hostel))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_residents_handler<H, R>(
    State(service): State<Arc<InventoryService<H, R>>>,
    Path(hostel_id): Path<String>,
) -> Response
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    match service.residents(&HostelId(hostel_id)) {
        Ok(residents) => (StatusCode::OK, Json(residents)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn assign_handler<H, R>(
    State(service): State<Arc<InventoryService<H, R>>>,
    Path(hostel_id): Path<String>,
    payload: Result<Json<ResidentSubmission>, JsonRejection>,
) -> Response
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let today = Local::now().date_naive();
    match service
        .assign_new_resident(&HostelId(hostel_id), submission, today)
        .await
    {
        Ok(resident) => (StatusCode::CREATED, Json(resident)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn resident_handler<H, R>(
    State(service): State<Arc<InventoryService<H, R>>>,
    Path(resident_id): Path<String>,
) -> Response
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    match service.resident(&ResidentId(resident_id)) {
        Ok(resident) => (StatusCode::OK, Json(resident)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn relocate_handler<H, R>(
    State(service): State<Arc<InventoryService<H, R>>>,
    Path(resident_id): Path<String>,
    payload: Result<Json<RelocationRequest>, JsonRejection>,
) -> Response
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let room = RoomNumber(request.room.trim().to_string());
    match service
        .relocate_resident(&ResidentId(resident_id), room)
        .await
    {
        Ok(resident) => (StatusCode::OK, Json(resident)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn exchange_handler<H, R>(
    State(service): State<Arc<InventoryService<H, R>>>,
    payload: Result<Json<ExchangeRequest>, JsonRejection>,
) -> Response
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let first = ResidentId(request.first);
    let second = ResidentId(request.second);
    match service.exchange_rooms(&first, &second).await {
        Ok((first, second)) => (StatusCode::OK, Json(vec![first, second])).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn remove_handler<H, R>(
    State(service): State<Arc<InventoryService<H, R>>>,
    Path(resident_id): Path<String>,
) -> Response
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    match service.remove_resident(&ResidentId(resident_id)).await {
        Ok((resident, discharge)) => {
            (StatusCode::OK, Json(RemovalView { resident, discharge })).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) fn status_for(err: &InventoryServiceError) -> StatusCode {
    match err {
        InventoryServiceError::Inventory(inner) => match inner {
            InventoryError::InvalidArchitecture(_)
            | InventoryError::InvalidResident(_)
            | InventoryError::InvalidHostel(_) => StatusCode::UNPROCESSABLE_ENTITY,
            InventoryError::RoomNotFound { .. }
            | InventoryError::ResidentNotFound { .. }
            | InventoryError::HostelNotFound { .. } => StatusCode::NOT_FOUND,
            InventoryError::AlreadyDefined { .. }
            | InventoryError::ArchitectureNotDefined { .. }
            | InventoryError::NoAvailableRoom { .. }
            | InventoryError::RoomFull { .. }
            | InventoryError::CrossHostel { .. }
            | InventoryError::SameResident { .. } => StatusCode::CONFLICT,
        },
        InventoryServiceError::Busy { .. } => StatusCode::CONFLICT,
        InventoryServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        InventoryServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        InventoryServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Malformed or mistyped bodies keep axum's status but use the shared error shape.
fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
    });
    (rejection.status(), Json(payload)).into_response()
}

fn error_response(err: InventoryServiceError) -> Response {
    let status = status_for(&err);
    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}

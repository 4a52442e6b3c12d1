use actix_web::{HttpRequest, HttpResponse, get, post, web};
use flood_core::{VehicleId, VehicleStatus};
use flood_dispatch::NewVehicle;
use serde::Deserialize;

use crate::auth::require_actor;
use crate::routes::common::{ListQuery, error_response, parse_uuid, respond};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: VehicleStatus,
}

#[get("/v1/vehicles")]
pub async fn list_vehicles(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let (limit, offset) = query.page();
    respond(state.registry.list_vehicles(limit, offset, &actor).await)
}

#[get("/v1/vehicles/{id}")]
pub async fn get_vehicle(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let vehicle_id = match parse_uuid(&id) {
        Ok(value) => VehicleId::from_uuid(value),
        Err(response) => return response,
    };
    respond(state.registry.get_vehicle(vehicle_id, &actor).await)
}

#[post("/v1/vehicles")]
pub async fn register_vehicle(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<NewVehicle>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match state
        .registry
        .register_vehicle(payload.into_inner(), &actor)
        .await
    {
        Ok(vehicle) => HttpResponse::Created().json(vehicle),
        Err(err) => error_response(&err),
    }
}

#[post("/v1/vehicles/{id}/status")]
pub async fn change_vehicle_status(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<StatusChange>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let vehicle_id = match parse_uuid(&id) {
        Ok(value) => VehicleId::from_uuid(value),
        Err(response) => return response,
    };
    respond(
        state
            .registry
            .change_vehicle_status(vehicle_id, payload.status, &actor)
            .await,
    )
}

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use flood_core::SupplyId;
use flood_dispatch::NewSupply;

use crate::auth::require_actor;
use crate::routes::common::{ListQuery, error_response, parse_uuid, respond};
use crate::state::AppState;

#[get("/v1/supplies")]
pub async fn list_supplies(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let (limit, offset) = query.page();
    respond(state.registry.list_supplies(limit, offset, &actor).await)
}

#[get("/v1/supplies/{id}")]
pub async fn get_supply(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let supply_id = match parse_uuid(&id) {
        Ok(value) => SupplyId::from_uuid(value),
        Err(response) => return response,
    };
    respond(state.registry.get_supply(supply_id, &actor).await)
}

#[post("/v1/supplies")]
pub async fn register_supply(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<NewSupply>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match state
        .registry
        .register_supply(payload.into_inner(), &actor)
        .await
    {
        Ok(supply) => HttpResponse::Created().json(supply),
        Err(err) => error_response(&err),
    }
}

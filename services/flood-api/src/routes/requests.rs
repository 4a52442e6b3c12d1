use actix_web::{HttpRequest, HttpResponse, get, post, web};
use flood_core::RequestId;
use flood_dispatch::{
    AssignTask, CancelRequest, ConfirmCompletion, ProgressUpdate, SubmitRequest, VerifyRequest,
};

use crate::auth::{optional_actor, require_actor};
use crate::routes::common::{ListQuery, error_response, parse_uuid, respond};
use crate::state::AppState;

fn request_id(raw: &str) -> Result<RequestId, HttpResponse> {
    parse_uuid(raw).map(RequestId::from_uuid)
}

#[post("/v1/requests")]
pub async fn submit_request(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<SubmitRequest>,
) -> HttpResponse {
    let citizen = match optional_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match state
        .coordinator
        .submit(payload.into_inner(), citizen.as_ref())
        .await
    {
        Ok(receipt) => HttpResponse::Created().json(receipt),
        Err(err) => error_response(&err),
    }
}

#[get("/v1/requests")]
pub async fn list_requests(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let (limit, offset) = query.page();
    respond(state.coordinator.list_requests(limit, offset, &actor).await)
}

#[get("/v1/requests/{id}")]
pub async fn get_request(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let request_id = match request_id(&id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    respond(state.coordinator.get_request(request_id, &actor).await)
}

#[get("/v1/requests/{id}/media")]
pub async fn request_media(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let request_id = match request_id(&id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    respond(state.coordinator.request_media(request_id, &actor).await)
}

#[get("/v1/requests/{id}/supplies")]
pub async fn request_supplies(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let request_id = match request_id(&id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    respond(state.coordinator.request_supplies(request_id, &actor).await)
}

#[post("/v1/requests/{id}/verify")]
pub async fn verify_request(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<VerifyRequest>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let request_id = match request_id(&id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    respond(
        state
            .coordinator
            .verify(request_id, payload.into_inner(), &actor)
            .await,
    )
}

#[post("/v1/requests/{id}/assign")]
pub async fn assign_task(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<AssignTask>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let request_id = match request_id(&id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    respond(
        state
            .coordinator
            .assign(request_id, payload.into_inner(), &actor)
            .await,
    )
}

#[post("/v1/requests/{id}/progress")]
pub async fn update_progress(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<ProgressUpdate>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let request_id = match request_id(&id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    respond(
        state
            .coordinator
            .update_progress(request_id, payload.into_inner(), &actor)
            .await,
    )
}

#[post("/v1/requests/{id}/confirm")]
pub async fn confirm_completion(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<ConfirmCompletion>,
) -> HttpResponse {
    let actor = match optional_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let request_id = match request_id(&id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    respond(
        state
            .coordinator
            .confirm(request_id, payload.into_inner(), actor.as_ref())
            .await,
    )
}

#[post("/v1/requests/{id}/cancel")]
pub async fn cancel_request(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<CancelRequest>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let request_id = match request_id(&id) {
        Ok(value) => value,
        Err(response) => return response,
    };
    respond(
        state
            .coordinator
            .cancel(request_id, payload.into_inner(), &actor)
            .await,
    )
}

#[get("/v1/track/{code}")]
pub async fn track_request(state: web::Data<AppState>, code: web::Path<String>) -> HttpResponse {
    respond(state.coordinator.track(&code).await)
}

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use flood_core::{TeamId, UserId};
use flood_dispatch::{NewTeam, TeamUpdate};
use serde::Deserialize;

use crate::auth::require_actor;
use crate::routes::common::{ListQuery, error_response, parse_uuid, respond};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DutyChange {
    pub on_duty: bool,
}

#[get("/v1/teams")]
pub async fn list_teams(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let (limit, offset) = query.page();
    respond(state.registry.list_teams(limit, offset, &actor).await)
}

#[get("/v1/teams/{id}")]
pub async fn get_team(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let team_id = match parse_uuid(&id) {
        Ok(value) => TeamId::from_uuid(value),
        Err(response) => return response,
    };
    respond(state.registry.get_team(team_id, &actor).await)
}

#[post("/v1/teams")]
pub async fn register_team(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<NewTeam>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    match state
        .registry
        .register_team(payload.into_inner(), &actor)
        .await
    {
        Ok(team) => HttpResponse::Created().json(team),
        Err(err) => error_response(&err),
    }
}

#[post("/v1/teams/{id}/duty")]
pub async fn set_team_duty(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<DutyChange>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let team_id = match parse_uuid(&id) {
        Ok(value) => TeamId::from_uuid(value),
        Err(response) => return response,
    };
    respond(
        state
            .registry
            .set_team_duty(team_id, payload.on_duty, &actor)
            .await,
    )
}

#[put("/v1/teams/{id}")]
pub async fn update_team(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<TeamUpdate>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let team_id = match parse_uuid(&id) {
        Ok(value) => TeamId::from_uuid(value),
        Err(response) => return response,
    };
    respond(
        state
            .registry
            .update_team(team_id, payload.into_inner(), &actor)
            .await,
    )
}

#[delete("/v1/teams/{id}/members/{user_id}")]
pub async fn remove_member(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let actor = match require_actor(&req) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let (team, user) = path.into_inner();
    let team_id = match parse_uuid(&team) {
        Ok(value) => TeamId::from_uuid(value),
        Err(response) => return response,
    };
    let user_id = match parse_uuid(&user) {
        Ok(value) => UserId::from_uuid(value),
        Err(response) => return response,
    };
    respond(
        state
            .registry
            .remove_member(team_id, user_id, &actor)
            .await,
    )
}

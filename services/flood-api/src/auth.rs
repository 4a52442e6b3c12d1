use actix_web::{HttpRequest, HttpResponse};
use flood_core::UserId;
use flood_identity::{Actor, Role};
use std::str::FromStr;
use uuid::Uuid;

use crate::routes::common::{bad_request, unauthorized};

const USER_ID_HEADER: &str = "x-flood-user-id";
const USER_NAME_HEADER: &str = "x-flood-user-name";
const USER_PHONE_HEADER: &str = "x-flood-user-phone";
const ROLES_HEADER: &str = "x-flood-roles";

/// Resolves the caller from identity headers set by the upstream gateway.
pub fn require_actor(req: &HttpRequest) -> Result<Actor, HttpResponse> {
    optional_actor(req)?.ok_or_else(|| unauthorized("missing auth header"))
}

/// Like [`require_actor`], but anonymous callers are allowed through.
pub fn optional_actor(req: &HttpRequest) -> Result<Option<Actor>, HttpResponse> {
    let Some(user_id) = header_value(req, USER_ID_HEADER) else {
        return Ok(None);
    };
    let user_id = Uuid::parse_str(user_id.trim())
        .map(UserId::from_uuid)
        .map_err(|_| bad_request("invalid UUID"))?;
    let roles = parse_list_header(req, ROLES_HEADER)
        .into_iter()
        .map(|value| Role::from_str(&value).map_err(|_| bad_request("invalid role")))
        .collect::<Result<Vec<_>, _>>()?;
    if roles.is_empty() {
        return Err(unauthorized("missing roles"));
    }
    let display_name =
        header_value(req, USER_NAME_HEADER).unwrap_or_else(|| format!("user-{user_id}"));

    let mut actor = Actor::new(user_id, display_name, roles);
    actor.phone = header_value(req, USER_PHONE_HEADER);
    Ok(Some(actor))
}

fn parse_list_header(req: &HttpRequest, name: &str) -> Vec<String> {
    header_value(req, name)
        .map(|value| {
            value
                .split(',')
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

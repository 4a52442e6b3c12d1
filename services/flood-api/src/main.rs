mod auth;
mod routes;
mod state;

use actix_web::{App, HttpServer, web};
use flood_config::{DispatchConfig, ServiceConfig};
use flood_observability::{ObservabilityConfig, init, log_startup};
use std::io;

use crate::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = ServiceConfig::from_env("flood-api");
    let handle = init(&ObservabilityConfig::from_service(&config));
    log_startup(&handle);

    let bind_addr = config.bind_addr.clone();
    let backend = config.storage_backend;
    let state = AppState::connect(config, DispatchConfig::from_env())
        .await
        .map_err(|err| io::Error::other(err.to_string()))?;
    let shared_state = web::Data::new(state);
    tracing::info!(bind_addr = %bind_addr, backend = ?backend, "HTTP listener starting");

    HttpServer::new(move || {
        App::new()
            .app_data(shared_state.clone())
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}

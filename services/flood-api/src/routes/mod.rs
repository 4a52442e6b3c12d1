pub mod common;
pub mod health;
pub mod requests;
pub mod supplies;
pub mod teams;
pub mod vehicles;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(requests::submit_request)
        .service(requests::list_requests)
        .service(requests::get_request)
        .service(requests::request_media)
        .service(requests::request_supplies)
        .service(requests::verify_request)
        .service(requests::assign_task)
        .service(requests::update_progress)
        .service(requests::confirm_completion)
        .service(requests::cancel_request)
        .service(requests::track_request)
        .service(teams::list_teams)
        .service(teams::get_team)
        .service(teams::register_team)
        .service(teams::set_team_duty)
        .service(teams::update_team)
        .service(teams::remove_member)
        .service(vehicles::list_vehicles)
        .service(vehicles::get_vehicle)
        .service(vehicles::register_vehicle)
        .service(vehicles::change_vehicle_status)
        .service(supplies::list_supplies)
        .service(supplies::get_supply)
        .service(supplies::register_supply);
}

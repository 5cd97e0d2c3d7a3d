pub mod config;
pub mod routes;
pub mod items;
pub mod store;
pub mod queries;
pub mod cors;
pub mod request_log;
pub mod error;
pub mod utils;
pub mod rate_limiter;
pub mod catchers;
pub use shared::{models::*, error::*, tally::*};

use rocket::{catchers, routes, Build, Rocket};

use crate::catchers::{bad_request, internal_error, not_found, too_many_requests, unprocessable};
use crate::items::{create_item, health, list_items};
use crate::routes::{all_options, cast_vote, create_poll, get_poll, get_results, list_polls, AppState};

/// Assembles the HTTP service around an already built state.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .attach(cors::CORS)
        .attach(request_log::RequestLogger)
        .manage(state)
        .mount(
            "/api",
            routes![list_polls, create_poll, get_poll, cast_vote, get_results, all_options],
        )
        .mount("/", routes![health, list_items, create_item])
        .register(
            "/",
            catchers![bad_request, not_found, unprocessable, too_many_requests, internal_error],
        )
}

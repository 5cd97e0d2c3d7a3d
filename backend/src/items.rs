use rocket::{State, get, post, http::Status, serde::json::Json};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, instrument};
use shared::{models::*, validation::*};
use crate::{
    error::ApiError,
    rate_limiter::RateLimited,
    routes::AppState,
    utils::json_body,
};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub uptime: f64,
    pub environment: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ItemCreated {
    pub message: &'static str,
    pub item: Item,
}

#[get("/health")]
pub async fn health(state: &State<AppState>) -> Json<Health> {
    Json(Health {
        status: "OK",
        timestamp: OffsetDateTime::now_utc(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.config.environment.as_str(),
    })
}

#[instrument(skip(state, _limit))]
#[get("/items?<query..>")]
pub async fn list_items(_limit: RateLimited, state: &State<AppState>, query: ItemQuery) -> Result<Json<ItemPage>, ApiError> {
    let page = parse_page_request(&query.page, &query.limit)?;
    Ok(Json(state.items.list(page, query.search.as_deref())?))
}

#[instrument(skip(state, _limit, request))]
#[post("/items", data = "<request>")]
pub async fn create_item(
    _limit: RateLimited,
    state: &State<AppState>,
    request: Result<Json<CreateItemRequest>, rocket::serde::json::Error<'_>>,
) -> Result<(Status, Json<ItemCreated>), ApiError> {
    let draft = validate_item_request(&json_body(request)?).map_err(ApiError::InvalidItem)?;
    let item = state.items.create(draft)?;
    info!("📦 Created item {}", item.id);
    Ok((Status::Created, Json(ItemCreated { message: "Item created successfully", item })))
}

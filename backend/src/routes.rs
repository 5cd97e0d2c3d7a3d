use std::sync::Arc;
use std::time::Instant;
use rocket::{State, get, post, http::Status, serde::json::Json};
use tracing::{debug, info, instrument};
use shared::{models::*, validation::*, PollResults};
use crate::{
    config::Config,
    error::ApiError,
    rate_limiter::{RateLimited, RateLimiter},
    store::{ItemStore, PollStore},
    utils::{json_body, parse_poll_id},
};

pub struct AppState {
    pub polls: PollStore,
    pub items: ItemStore,
    pub limiter: Arc<RateLimiter>,
    pub config: Config,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let (polls, items) = if config.seed_demo_data {
            (PollStore::seeded(), ItemStore::seeded())
        } else {
            (PollStore::new(), ItemStore::new())
        };
        Self::with_stores(config, polls, items)
    }

    pub fn with_stores(config: Config, polls: PollStore, items: ItemStore) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::new(config.rate_limit_max, config.rate_limit_window_minutes)),
            polls,
            items,
            config,
            started_at: Instant::now(),
        }
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

#[instrument(skip(state, _limit))]
#[get("/polls?<query..>")]
pub async fn list_polls(_limit: RateLimited, state: &State<AppState>, query: PollQuery) -> ApiResult<PollPage> {
    let params = parse_poll_query(&query)?;
    let page = state.polls.list(&params)?;
    debug!("Listing {} of {} polls", page.polls.len(), page.pagination.total_items);
    Ok(Json(ApiResponse::ok(page)))
}

#[instrument(skip(state, _limit, request))]
#[post("/polls", data = "<request>")]
pub async fn create_poll(
    _limit: RateLimited,
    state: &State<AppState>,
    request: Result<Json<CreatePollRequest>, rocket::serde::json::Error<'_>>,
) -> Result<(Status, Json<ApiResponse<Poll>>), ApiError> {
    let draft = validate_poll_request(&json_body(request)?)?;
    let poll = state.polls.create(draft)?;
    info!("📊 Created poll {} with {} options", poll.id, poll.options.len());
    Ok((Status::Created, Json(ApiResponse::with_message("Poll created successfully", poll))))
}

#[instrument(skip(state, _limit))]
#[get("/polls/<id>")]
pub async fn get_poll(_limit: RateLimited, state: &State<AppState>, id: &str) -> ApiResult<Poll> {
    let poll = state.polls.get(parse_poll_id(id)?)?;
    Ok(Json(ApiResponse::ok(poll)))
}

#[instrument(skip(state, _limit, request), fields(poll_id = %id))]
#[post("/polls/<id>/votes", data = "<request>")]
pub async fn cast_vote(
    _limit: RateLimited,
    state: &State<AppState>,
    id: &str,
    request: Result<Json<VoteRequest>, rocket::serde::json::Error<'_>>,
) -> ApiResult<VoteReceipt> {
    let poll_id = parse_poll_id(id)?;
    let option_id = validate_vote_request(&json_body(request)?)?;
    let receipt = state.polls.apply_vote(poll_id, option_id)?;
    debug!("Vote counted for option {}, poll total now {}", option_id, receipt.total_votes);
    Ok(Json(ApiResponse::with_message("Vote submitted successfully", receipt)))
}

#[instrument(skip(state, _limit))]
#[get("/polls/<id>/results")]
pub async fn get_results(_limit: RateLimited, state: &State<AppState>, id: &str) -> ApiResult<PollResults> {
    let results = state.polls.results(parse_poll_id(id)?)?;
    Ok(Json(ApiResponse::ok(results)))
}

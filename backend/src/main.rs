use std::sync::Arc;
use backend::{
    build_rocket,
    config::Config,
    rate_limiter::RateLimiter,
    routes::AppState,
};
use tokio::time::{interval, Duration};
use tracing::{debug, info};

async fn run_cleanup_task(limiter: Arc<RateLimiter>) {
    let mut interval = interval(Duration::from_secs(60));
    info!("🧹 Rate limit cleanup started");

    loop {
        interval.tick().await;
        let removed = limiter.prune();
        if removed > 0 {
            debug!("🗑️ Dropped {} stale rate limit entries", removed);
        }
    }
}

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🚀 Starting polling server");

    let config = Config::from_secrets(&secret_store);
    info!(
        "📋 Environment: {}, rate limit: {} requests / {} min",
        config.environment.as_str(),
        config.rate_limit_max,
        config.rate_limit_window_minutes
    );

    let state = AppState::new(config);
    tokio::spawn(run_cleanup_task(Arc::clone(&state.limiter)));

    Ok(build_rocket(state).into())
}

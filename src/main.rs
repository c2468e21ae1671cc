mod fixtures;
mod leaderboard;
mod predictions;
mod scoring;
mod shared;
mod standings;
mod tournament;

use axum::{
    routing::{get, post},
    Router,
};
use shared::AppState;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scorepool=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting scorepool server");

    // Create shared application state with dependency injection
    // DATABASE_URL selects PostgreSQL; without it everything runs in memory.
    let app_state = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .expect("Failed to connect to database");
            AppState::postgres(pool)
        }
        Err(_) => AppState::in_memory(),
    };

    // build our application routes
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/guesses", post(predictions::save_guess))
        .route(
            "/tournaments/:tournament_id/groups/:group_id/standings",
            get(standings::get_group_standings),
        )
        .route(
            "/tournaments/:tournament_id/users/:user_id/boosts",
            get(predictions::get_boost_usage),
        )
        .route(
            "/tournaments/:tournament_id/leaderboard",
            get(leaderboard::get_leaderboard),
        )
        .route(
            "/tournaments/:tournament_id/leaderboard/roll",
            post(leaderboard::roll_yesterday_snapshots),
        )
        .route(
            "/tournaments/:tournament_id/users/:user_id/qualification",
            get(leaderboard::get_user_qualification),
        )
        .route(
            "/tournaments/:tournament_id/recalculate",
            post(leaderboard::trigger_recalculation),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}

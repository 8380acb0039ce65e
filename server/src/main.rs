mod app;
mod error;
mod routes;
mod telemetry;

use app::{run_server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();
    let database_url = dotenv::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = db::establish_connection(&database_url).await?;

    tracing::info!("Running db migrations...");
    db::run_migrations(&pool).await?;

    let state = AppState::initialize(pool).await?;
    run_server(state).await
}

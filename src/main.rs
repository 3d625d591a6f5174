use std::net::SocketAddr;
use std::sync::Arc;

use exams_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    store::postgres::PgExamStore,
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = Arc::new(PgExamStore::new(pool));
    let state = AppState::new(store);
    let app = exams_backend::app(state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use mock_server::{MockState, Standing};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let app_id = std::env::var("CARROT_APP_ID").unwrap_or_else(|_| "42".to_string());
    let app_secret = std::env::var("CARROT_APP_SECRET").unwrap_or_else(|_| "s3cr3t".to_string());

    let state = MockState::new(&app_id, &app_secret);
    state.add_user("demo", "demo-token", Standing::Authorized).await;

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, %app_id, "mock Carrot listening");
    mock_server::run(listener, state).await
}

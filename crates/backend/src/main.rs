use backend::shared::config::{get_fixtures_path, load_config};
use backend::shared::{AppState, Fixtures};
use backend::system;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = load_config()?;
    let fixtures = match get_fixtures_path(&config) {
        Some(path) => Fixtures::load(&path)?,
        None => {
            tracing::info!("Serving the embedded sample fixtures");
            Fixtures::sample()?
        }
    };
    tracing::info!("{} endpoints configured", fixtures.len());
    for problem in fixtures.validate() {
        tracing::warn!("Fixture does not match the API contract: {}", problem);
    }

    let app = backend::app(AppState::new(fixtures));
    let addr = config.server.socket_addr()?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;
    Ok(())
}

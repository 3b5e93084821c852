mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use adly_api::auth::{AppState, AppStateInner};
use adly_api::oauth::{DevSignIn, GoogleOAuth, IdentityProvider};

use crate::config::{Config, ProviderConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adly_server=debug,adly_api=debug,adly_db=info,tower_http=debug".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {}", e);
            eprintln!("       Set it in your .env file and restart.");
            std::process::exit(1);
        }
    };

    // Init database
    let db = adly_db::Database::open(&config.db_path)?;

    let provider = match &config.provider {
        ProviderConfig::Google { client_id, client_secret } => IdentityProvider::Google(GoogleOAuth::new(
            client_id.clone(),
            client_secret.clone(),
            config.redirect_uri(),
        )?),
        ProviderConfig::Dev { email } => {
            warn!("Dev sign-in enabled: anyone reaching this server is signed in as {}", email);
            IdentityProvider::Dev(DevSignIn::new(email.clone(), config.redirect_uri()))
        }
    };

    let state: AppState = Arc::new(AppStateInner {
        db: Arc::new(db),
        jwt_secret: config.jwt_secret.clone(),
        session_ttl: chrono::Duration::hours(config.session_ttl_hours),
        provider,
        secure_cookies: config.secure_cookies(),
    });

    let app = adly_api::routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Adly server listening on {}", addr);
    info!("Public URL: {}", config.public_url);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use media_core::{
    Authorizer, CachedKeySource, ImageNormalizer, JwksFetcher, KeySetSource, MemoryObjectStore,
    ObjectStore, Pipeline, TransformParams,
};
use media_gateway::config::{AppConfig, AuthSettings, StorageBackend};
use media_gateway::storage::S3ObjectStore;
use media_gateway::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_gateway=info,media_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn ObjectStore> = match &config.storage {
        StorageBackend::S3(settings) => Arc::new(S3ObjectStore::new(settings)?),
        StorageBackend::Memory => {
            warn!("using in-memory storage, objects are lost on restart");
            Arc::new(MemoryObjectStore::new())
        }
    };

    let params = TransformParams::new(config.rotate_width, config.rotate_height, None)?;
    let mut pipeline = Pipeline::new(store, ImageNormalizer::new(params));

    match build_authorizer(&config.auth)? {
        Some(authorizer) => {
            pipeline = pipeline
                .with_authorizer(authorizer)
                .with_protected_retrieve(config.auth.protect_retrieve);
        }
        None => warn!("JWKS_URL is not set, ingest requests are not authorized"),
    }

    let app = router(AppState::new(pipeline), config.max_body_bytes);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "media-gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_authorizer(auth: &AuthSettings) -> anyhow::Result<Option<Authorizer>> {
    let Some(url) = &auth.jwks_url else {
        return Ok(None);
    };

    let fetcher = JwksFetcher::new(url.as_str(), auth.timeout)?;
    let source: Arc<dyn KeySetSource> = if auth.cache_ttl.is_zero() {
        Arc::new(fetcher)
    } else {
        Arc::new(CachedKeySource::new(fetcher, auth.cache_ttl))
    };

    info!(
        jwks_url = %url,
        cache_ttl_secs = auth.cache_ttl.as_secs(),
        protect_retrieve = auth.protect_retrieve,
        "token verification enabled"
    );
    Ok(Some(Authorizer::new(source)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

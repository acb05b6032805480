//! Axum server bootstrap - the composition root.
//!
//! This module is the only place where the transport, speech engines and
//! services are wired together. Everything is constructed once and shared
//! with handlers through [`AppState`](crate::AppState).

use std::sync::Arc;

use adapter_core::{
    AdapterSettings, ConversionService, CustomHeaders, ForwardTarget, ForwardTransport,
    ForwardingService, VoiceWorkflow, validate_settings,
};
use adapter_http::{TransportClient, TransportConfig};
use adapter_voice::SpeechEngines;
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::create_router;

/// Application context for the Axum adapter.
pub struct AxumContext {
    pub settings: AdapterSettings,
    pub conversion: Arc<ConversionService>,
    pub forwarding: Arc<ForwardingService>,
    pub workflow: Arc<VoiceWorkflow>,
    /// Kept concrete so shutdown can close the pool.
    pub transport: Arc<TransportClient>,
}

impl AxumContext {
    /// Wire services around `engines`, with a transport built from `settings`.
    pub fn new(settings: AdapterSettings, engines: SpeechEngines) -> Self {
        let transport = Arc::new(TransportClient::new(TransportConfig::from_settings(
            &settings,
        )));
        let forward: Arc<dyn ForwardTransport> = transport.clone();

        let conversion = Arc::new(ConversionService::new(
            engines.transcriber,
            engines.synthesizer,
            settings.max_batch_items,
        ));
        let forwarding = Arc::new(ForwardingService::new(
            Arc::clone(&conversion),
            Arc::clone(&forward),
        ));
        let workflow = Arc::new(VoiceWorkflow::new(Arc::clone(&conversion), forward));

        Self {
            settings,
            conversion,
            forwarding,
            workflow,
            transport,
        }
    }

    /// The configured downstream endpoint, with per-request headers.
    pub fn target(&self, headers: Option<CustomHeaders>) -> ForwardTarget {
        ForwardTarget::new(&self.settings.target_url, self.settings.forward_method)
            .with_headers(headers)
    }
}

/// Validate settings and build the context with the configured engines.
pub fn bootstrap(settings: AdapterSettings) -> Result<AxumContext> {
    validate_settings(&settings).context("Invalid settings")?;
    let engines = SpeechEngines::from_settings(&settings).context("Failed to build speech engines")?;

    info!(
        target_url = %settings.target_url,
        method = %settings.forward_method,
        timeout_secs = settings.request_timeout_secs,
        stt_engine = engines.transcriber.engine_name(),
        tts_engine = engines.synthesizer.engine_name(),
        "Adapter bootstrap complete"
    );

    Ok(AxumContext::new(settings, engines))
}

/// Serve until Ctrl-C, then release the outbound connection pool.
pub async fn start_server(settings: AdapterSettings) -> Result<()> {
    let ctx = bootstrap(settings)?;
    let addr = format!("{}:{}", ctx.settings.host, ctx.settings.port);
    let transport = Arc::clone(&ctx.transport);

    let app = create_router(ctx);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("channel adapter listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down application...");
    if transport.close().await {
        info!("REST API client closed successfully");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

use slack_mirror::config::load_settings;
use slack_mirror::error::Result;
use slack_mirror::logging::init_tracing;
use slack_mirror::metadata::MetadataResolver;
use slack_mirror::relay::RelayPipeline;
use slack_mirror::slack::{EventHandler, SlackApi, SlackClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Load configuration before anything else so a missing variable fails fast
    let settings = load_settings()?;
    init_tracing(&settings.log);

    tracing::info!("Starting Slack Mirror");
    tracing::debug!(
        target_channel = %settings.relay.target_channel,
        blacklist = ?settings.relay.blacklist,
        cache_ttl_secs = settings.relay.cache_ttl.as_secs(),
        "Configuration loaded"
    );

    // Create Slack client
    let slack_client = Arc::new(SlackClient::new(settings.slack.clone())?);
    let api: Arc<dyn SlackApi> = slack_client.clone();

    let pipeline = Arc::new(RelayPipeline::from_config(api.clone(), &settings.relay));

    // The bot must be a member of the mirror channel to post there
    api.join_channel(pipeline.target()).await?;

    if let Some(interval) = settings.relay.stats_interval {
        spawn_cache_maintenance(pipeline.resolver().clone(), interval);
    }

    let event_handler = EventHandler::new(slack_client, pipeline);

    // Setup shutdown signal handler in background
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<String>(1);
    tokio::spawn(async move {
        let signal_name = setup_shutdown_handler().await;
        let _ = shutdown_tx.send(signal_name).await;
    });

    let result = tokio::select! {
        result = event_handler.start() => {
            tracing::info!("Event handler completed normally");
            result
        }
        Some(signal_name) = shutdown_rx.recv() => {
            tracing::info!(
                signal = %signal_name,
                "Received shutdown signal, stopping relay"
            );
            Ok(())
        }
    };

    tracing::info!("Application shutdown sequence complete");
    result
}

/// Periodically purge expired metadata and log cache statistics
fn spawn_cache_maintenance(resolver: Arc<MetadataResolver>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = resolver.purge_expired();
            tracing::debug!(removed = removed, "Metadata cache maintenance");
            resolver.log_stats();
        }
    });
}

/// Setup signal handlers for graceful shutdown
/// Handles SIGINT (Ctrl+C), SIGTERM, and SIGQUIT on Unix systems
async fn setup_shutdown_handler() -> String {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        let (Ok(mut sigint), Ok(mut sigterm), Ok(mut sigquit)) = (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
            signal(SignalKind::quit()),
        ) else {
            tracing::warn!("Failed to install signal handlers, falling back to Ctrl+C");
            let _ = signal::ctrl_c().await;
            return "Ctrl+C".to_string();
        };

        tokio::select! {
            _ = sigint.recv() => {
                tracing::debug!("Caught SIGINT signal");
                "SIGINT (Ctrl+C)".to_string()
            }
            _ = sigterm.recv() => {
                tracing::debug!("Caught SIGTERM signal");
                "SIGTERM".to_string()
            }
            _ = sigquit.recv() => {
                tracing::debug!("Caught SIGQUIT signal");
                "SIGQUIT".to_string()
            }
        }
    }

    #[cfg(not(unix))]
    {
        // On Windows, only handle Ctrl+C
        let _ = signal::ctrl_c().await;
        tracing::debug!("Caught Ctrl+C signal");
        "Ctrl+C".to_string()
    }
}

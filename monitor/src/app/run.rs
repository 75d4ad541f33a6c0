//! Main application run loop

use std::future::Future;

use tracing::info;

use crate::app::options::MonitorOptions;
use crate::errors::MonitorError;
use crate::http::client::HttpClient;
use crate::render::terminal::TerminalRenderer;
use crate::workers::poller::Poller;

/// Run the monitor until `shutdown_signal` resolves
pub async fn run(
    options: MonitorOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), MonitorError> {
    info!("Initializing deploywatch...");

    let http_client = HttpClient::new(
        &options.api_base_url,
        options.token.clone(),
        options.team_id.clone(),
    )?;

    let renderer = TerminalRenderer::new(options.project_id.clone(), options.polling_interval);
    renderer.print_banner(options.mode);

    let mut poller = Poller::new(options.poller(), http_client, renderer);
    poller.run(tokio::time::sleep, Box::pin(shutdown_signal)).await;

    info!("deploywatch stopped");
    Ok(())
}

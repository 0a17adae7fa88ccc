use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studio::config::Config;
use studio::errors::AppError;
use studio::models::lookup_template;
use studio::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Studio v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::build(config).await?;
    let mut session = state.restore_session().await?;

    // Optional first argument switches template: an id or a name
    if let Some(query) = std::env::args().nth(1) {
        match lookup_template(&state.catalog, &query) {
            Some(template) => session.switch_template(template.clone()).await,
            None => warn!("Unknown template '{query}'"),
        }
    }

    match session.request_export() {
        Ok(request) => {
            // errors are already reported through the sink
            if let Ok(exported) = state
                .engine
                .export_resume(&request.document, Some(&request.template))
                .await
            {
                info!(
                    "{} page(s) written to {}",
                    exported.page_count(),
                    exported.saved_to.display()
                );
            }
        }
        Err(AppError::MissingTemplate) => {
            info!("No template selected. Pass a template id or name to export.");
        }
        Err(AppError::Validation(errors)) => {
            for key in errors.keys() {
                warn!("{key}: {}", errors.get(key).unwrap_or_default());
            }
        }
        Err(e) => return Err(e.into()),
    }

    session.flush().await?;
    Ok(())
}

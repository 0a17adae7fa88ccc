use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::editor::{EditorSession, JsonFileStore, Persistence};
use crate::errors::AppError;
use crate::export::ExportEngine;
use crate::layout::{FontFace, Typeface};
use crate::models::{template_catalog, TemplateDescriptor};
use crate::notify::{LogSink, NotificationSink};

/// Long-lived collaborators shared by the editor session and the export path.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Persistence>,
    pub catalog: Vec<TemplateDescriptor>,
    pub sink: Arc<dyn NotificationSink>,
    pub engine: ExportEngine,
}

impl AppState {
    /// Wires the file store, log sink and export engine from `config`.
    pub async fn build(config: Config) -> Result<Self> {
        let typeface = match &config.font_path {
            Some(path) => {
                let face = FontFace::load(path)
                    .await
                    .with_context(|| format!("Failed to load font {}", path.display()))?;
                Typeface::Loaded(Arc::new(face))
            }
            None => {
                warn!("STUDIO_FONT_PATH not set; exported text will be greeked");
                Typeface::default()
            }
        };

        let sink: Arc<dyn NotificationSink> = Arc::new(LogSink);
        let store: Arc<dyn Persistence> = Arc::new(JsonFileStore::new(&config.draft_path));
        let engine = ExportEngine::new(config.export_settings(), typeface, Arc::clone(&sink));
        info!(
            "Draft file: {}, export dir: {}",
            config.draft_path.display(),
            config.export_dir.display()
        );

        Ok(Self {
            config,
            store,
            catalog: template_catalog(),
            sink,
            engine,
        })
    }

    pub async fn restore_session(&self) -> Result<EditorSession, AppError> {
        EditorSession::restore(
            Arc::clone(&self.store),
            self.config.autosave_quiet,
            Arc::clone(&self.sink),
        )
        .await
    }
}

//! Pagination / export engine.
//!
//! # Architecture
//! - `export_resume` is the full path: readiness check → render → layout → `export_to_document`.
//! - `export_to_document` plans the pages, rasterizes them one band at a time and assembles the
//!   PDF inside `tokio::task::spawn_blocking`, then writes it to the export directory.
//! - At most one export runs per engine. A second request while one is pending is rejected with
//!   `ExportError::InProgress`; the engine never queues.
//! - Every outcome is reported through the notification sink. Failures leave no partial state,
//!   so a failed export can simply be re-invoked.

pub mod pagination;
pub mod pdf;
pub mod raster;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::editor::validation::check_readiness;
use crate::errors::AppError;
use crate::layout::{default_surface_config, layout_document, Surface, SurfaceConfig, Typeface};
use crate::models::{ResumeDocument, TemplateDescriptor};
use crate::notify::{Notification, NotificationSink};
use crate::render::render;

pub use pagination::{plan_pages, PageGeometry, PagePlan, PageSlice};
pub use pdf::EncodedPage;
pub use raster::PageImage;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    InProgress,

    #[error("surface of {width}x{height} px cannot be rasterized")]
    SurfaceUnavailable { width: u32, height: u32 },

    #[error("could not encode page images: {0}")]
    Encode(#[source] io::Error),

    #[error("could not save export: {0}")]
    Save(#[source] io::Error),

    #[error("export task failed: {0}")]
    TaskFailed(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Settings and output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Device pixels per CSS pixel when rasterizing.
    pub scale: f32,
    pub geometry: PageGeometry,
    pub export_dir: PathBuf,
    pub surface: SurfaceConfig,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            scale: 2.0,
            geometry: PageGeometry::A4,
            export_dir: PathBuf::from("exports"),
            surface: default_surface_config(),
        }
    }
}

/// A finished export. The PDF has already been written to `saved_to`.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub id: Uuid,
    pub file_name: String,
    pub saved_to: PathBuf,
    pub plan: PagePlan,
    /// Compressed page images, in page order.
    pub pages: Vec<EncodedPage>,
    pub pdf: Bytes,
    pub created_at: DateTime<Utc>,
}

impl ExportedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// `"{name with spaces as hyphens}-Resume.pdf"`, or `"Resume.pdf"` for a blank name.
pub fn export_file_name(owner_name: &str) -> String {
    let trimmed = owner_name.trim();
    if trimmed.is_empty() {
        return "Resume.pdf".to_string();
    }
    let stem: String = trimmed
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '-',
            other => other,
        })
        .collect();
    format!("{stem}-Resume.pdf")
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ExportEngine {
    settings: Arc<ExportSettings>,
    typeface: Typeface,
    sink: Arc<dyn NotificationSink>,
    in_flight: Arc<Mutex<()>>,
}

impl ExportEngine {
    pub fn new(settings: ExportSettings, typeface: Typeface, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            settings: Arc::new(settings),
            typeface,
            sink,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Readiness check, render, layout and export in one go.
    ///
    /// An incomplete document is rejected before anything is rasterized.
    pub async fn export_resume(
        &self,
        document: &ResumeDocument,
        template: Option<&TemplateDescriptor>,
    ) -> Result<ExportedDocument, AppError> {
        if let Err(errors) = check_readiness(document) {
            warn!("Export blocked: {} required field(s) missing or invalid", errors.len());
            return Err(self.report(AppError::Validation(errors)));
        }
        let visual = render(document, template).map_err(|e| self.report(e))?;
        let surface = layout_document(&visual, &self.typeface, &self.settings.surface);
        self.export_to_document(surface, &document.personal_info.name)
            .await
    }

    /// Rasterizes and paginates `surface`, then writes the PDF to the export directory.
    pub async fn export_to_document(
        &self,
        surface: Surface,
        owner_name: &str,
    ) -> Result<ExportedDocument, AppError> {
        let _guard = match self.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("Export requested while another export is in flight");
                return Err(self.report(ExportError::InProgress.into()));
            }
        };

        self.sink
            .notify(Notification::info("EXPORT_STARTED", "Preparing your PDF..."));

        match self.run_export(surface, owner_name).await {
            Ok(document) => {
                info!(
                    "Exported {} ({} page(s), {} bytes) to {}",
                    document.file_name,
                    document.page_count(),
                    document.pdf.len(),
                    document.saved_to.display()
                );
                self.sink.notify(Notification::success(
                    "EXPORT_SUCCEEDED",
                    "PDF exported successfully!",
                ));
                Ok(document)
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    async fn run_export(&self, surface: Surface, owner_name: &str) -> Result<ExportedDocument, ExportError> {
        let file_name = export_file_name(owner_name);
        let title = file_name.trim_end_matches(".pdf").to_string();
        let settings = Arc::clone(&self.settings);
        let typeface = self.typeface.clone();

        // CPU-bound — keep it off the async executor.
        let (plan, pages, pdf) = tokio::task::spawn_blocking(move || {
            let (width, height) = raster::raster_size(&surface, settings.scale)?;
            let plan = plan_pages(width, height, settings.geometry)?;
            // one raw page in memory at a time
            let mut pages = Vec::with_capacity(plan.page_count());
            for page in raster::render_pages(&surface, &typeface, settings.scale, &plan) {
                pages.push(pdf::encode_page(&page?)?);
            }
            debug!(
                "Rasterized {width}x{height} px surface into {} page(s) ({} ops)",
                pages.len(),
                surface.ops.len()
            );
            let pdf = pdf::assemble_pdf(&pages, settings.geometry, surface.background, &title)?;
            Ok::<_, ExportError>((plan, pages, pdf))
        })
        .await
        .map_err(|e| ExportError::TaskFailed(format!("spawn_blocking failed in export: {e}")))??;

        let saved_to = save_pdf(&self.settings.export_dir, &file_name, &pdf).await?;

        Ok(ExportedDocument {
            id: Uuid::new_v4(),
            file_name,
            saved_to,
            plan,
            pages,
            pdf: Bytes::from(pdf),
            created_at: Utc::now(),
        })
    }

    fn report(&self, err: AppError) -> AppError {
        self.sink.notify(err.to_notification());
        err
    }
}

async fn save_pdf(dir: &Path, file_name: &str, pdf: &[u8]) -> Result<PathBuf, ExportError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(ExportError::Save)?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, pdf).await.map_err(ExportError::Save)?;
    Ok(path)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{template_catalog, ExperienceField, EducationField, PersonalField};
    use crate::notify::{ChannelSink, NotificationLevel};
    use crate::render::Rgba;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn engine(dir: &Path) -> (ExportEngine, UnboundedReceiver<Notification>) {
        let (sink, rx) = ChannelSink::new();
        let settings = ExportSettings {
            export_dir: dir.to_path_buf(),
            ..ExportSettings::default()
        };
        (ExportEngine::new(settings, Typeface::default(), Arc::new(sink)), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<&'static str> {
        let mut codes = Vec::new();
        while let Ok(n) = rx.try_recv() {
            codes.push(n.code);
        }
        codes
    }

    fn ready_document() -> ResumeDocument {
        let mut doc = ResumeDocument::default();
        doc.set_personal(PersonalField::Name, "Jane Doe");
        doc.set_personal(PersonalField::Email, "jane@x.com");
        doc.set_personal(PersonalField::Phone, "1234567890");
        doc.update_experience(1, ExperienceField::Company, "Acme").unwrap();
        doc.update_experience(1, ExperienceField::Position, "Engineer").unwrap();
        doc.update_experience(1, ExperienceField::StartDate, "01/2020").unwrap();
        doc.update_education(1, EducationField::Institution, "State U").unwrap();
        doc.update_education(1, EducationField::Degree, "BS").unwrap();
        doc.update_skill(0, "Rust").unwrap();
        doc
    }

    fn tall_surface(height: f32) -> Surface {
        Surface {
            width: 7.0,
            height,
            background: Rgba::WHITE,
            ops: Vec::new(),
        }
    }

    #[test]
    fn test_file_name_from_owner() {
        assert_eq!(export_file_name("Jane Doe"), "Jane-Doe-Resume.pdf");
        assert_eq!(export_file_name("  Jane Doe "), "Jane-Doe-Resume.pdf");
        assert_eq!(export_file_name("Jane"), "Jane-Resume.pdf");
        assert_eq!(export_file_name("   "), "Resume.pdf");
        assert_eq!(export_file_name("a/b"), "a-b-Resume.pdf");
    }

    #[tokio::test]
    async fn test_export_writes_paginated_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, mut rx) = engine(dir.path());
        // 7 x 30 css px at 2x → 14 x 60 raster → 4 pages
        let doc = engine
            .export_to_document(tall_surface(30.0), "Jane Doe")
            .await
            .unwrap();

        assert_eq!(doc.page_count(), 4);
        assert_eq!(doc.file_name, "Jane-Doe-Resume.pdf");
        assert_eq!(doc.saved_to, dir.path().join("Jane-Doe-Resume.pdf"));
        let on_disk = tokio::fs::read(&doc.saved_to).await.unwrap();
        assert_eq!(on_disk, doc.pdf.to_vec());
        assert_eq!(drain(&mut rx), vec!["EXPORT_STARTED", "EXPORT_SUCCEEDED"]);
        assert!(engine.in_flight.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_export_rejected_while_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, mut rx) = engine(dir.path());
        let held = engine.in_flight.clone();
        let guard = held.lock().await;

        let err = engine
            .export_to_document(tall_surface(30.0), "Jane Doe")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Export(ExportError::InProgress)));
        assert_eq!(drain(&mut rx), vec!["EXPORT_ERROR"]);

        drop(guard);
        assert!(engine
            .export_to_document(tall_surface(30.0), "Jane Doe")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_failed_export_reports_and_can_retry() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, mut rx) = engine(dir.path());

        let err = engine
            .export_to_document(tall_surface(0.0), "Jane Doe")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Export(ExportError::SurfaceUnavailable { .. })
        ));
        let codes = drain(&mut rx);
        assert_eq!(codes, vec!["EXPORT_STARTED", "EXPORT_ERROR"]);
        assert!(!dir.path().join("Jane-Doe-Resume.pdf").exists());

        assert!(engine
            .export_to_document(tall_surface(30.0), "Jane Doe")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_incomplete_document_never_rasterizes() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, mut rx) = engine(dir.path());
        let mut doc = ready_document();
        doc.set_personal(PersonalField::Email, "");

        let err = engine
            .export_resume(&doc, template_catalog().first())
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => assert!(errors.contains_key("email")),
            other => panic!("expected validation error, got {other:?}"),
        }
        let notes: Vec<Notification> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
        assert_eq!(
            notes[0].message,
            "Please fill in all required fields before exporting"
        );
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_missing_template_blocks_export() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, mut rx) = engine(dir.path());
        let err = engine.export_resume(&ready_document(), None).await.unwrap_err();
        assert!(matches!(err, AppError::MissingTemplate));
        assert_eq!(drain(&mut rx), vec!["MISSING_TEMPLATE"]);
    }

    #[tokio::test]
    async fn test_export_resume_every_template() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, _rx) = engine(dir.path());
        for template in template_catalog() {
            let doc = engine
                .export_resume(&ready_document(), Some(&template))
                .await
                .unwrap();
            assert!(doc.page_count() >= 1, "{}", template.name);
            assert_eq!(doc.pages[0].width, 1588);
            assert!(doc.pdf.starts_with(b"%PDF-"));
        }
    }
}

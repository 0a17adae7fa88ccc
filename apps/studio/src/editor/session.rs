//! The editor session: sole owner of the working document and the selected template.
//!
//! Every edit validates the touched field inline and schedules a debounced autosave of the whole
//! state. Nothing else holds a reference to the document; renders and exports get clones.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::editor::autosave::{AutoSaver, SaveStatus};
use crate::editor::persistence::{PersistedState, Persistence, PersistenceError};
use crate::editor::validation::{
    check_readiness, education_key, education_prefix, experience_key, experience_prefix,
    validate_education, validate_experience, validate_personal, FieldErrors,
};
use crate::errors::AppError;
use crate::models::{
    EducationField, ExperienceField, PersonalField, ResumeDocument, TemplateDescriptor,
};
use crate::notify::{Notification, NotificationSink};

/// Hand-off to the preview screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRequest {
    pub template: TemplateDescriptor,
    pub document: ResumeDocument,
    /// Set when the preview should start the PDF export as soon as it is shown.
    pub auto_export: bool,
}

pub struct EditorSession {
    document: ResumeDocument,
    template: Option<TemplateDescriptor>,
    errors: FieldErrors,
    autosaver: AutoSaver,
    sink: Arc<dyn NotificationSink>,
}

impl EditorSession {
    /// A fresh session with the empty default document.
    pub fn new(
        store: Arc<dyn Persistence>,
        quiet: Duration,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            document: ResumeDocument::default(),
            template: None,
            errors: FieldErrors::default(),
            autosaver: AutoSaver::new(store, quiet),
            sink,
        }
    }

    /// Restores the session from `store`.
    ///
    /// A draft with an unrecognised shape is discarded and the session starts from defaults.
    /// A draft that loads but breaks the document invariants is repaired. I/O failures propagate.
    pub async fn restore(
        store: Arc<dyn Persistence>,
        quiet: Duration,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, AppError> {
        let loaded = store.load().await;
        let mut session = Self::new(store, quiet, sink);

        match loaded {
            Ok(Some(state)) => {
                let mut document = state.resume_document;
                let report = document.repair();
                if !report.is_clean() {
                    warn!("Restored draft needed repair: {report:?}");
                }
                info!(
                    "Restored draft saved at {} (template: {})",
                    state.saved_at,
                    state
                        .template_descriptor
                        .as_ref()
                        .map_or("none", |t| t.name.as_str())
                );
                session.document = document;
                session.template = state.template_descriptor;
            }
            Ok(None) => debug!("No stored draft, starting from defaults"),
            Err(PersistenceError::StaleShape(e)) => {
                warn!("Discarding stored draft with an unrecognised shape: {e}");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(session)
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn template(&self) -> Option<&TemplateDescriptor> {
        self.template.as_ref()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosaver.status()
    }

    pub fn subscribe_save_status(&self) -> watch::Receiver<SaveStatus> {
        self.autosaver.subscribe()
    }

    // ── personal info / summary ────────────────────────────────────────────

    pub async fn set_personal(&mut self, field: PersonalField, value: impl Into<String>) {
        let value = value.into();
        self.errors.set(field.key(), validate_personal(field, &value));
        self.document.set_personal(field, value);
        self.touch().await;
    }

    pub async fn set_summary(&mut self, value: impl Into<String>) {
        self.document.set_summary(value);
        self.touch().await;
    }

    // ── experience ─────────────────────────────────────────────────────────

    pub async fn add_experience(&mut self) -> u32 {
        let id = self.document.add_experience();
        self.touch().await;
        id
    }

    /// Removes the entry and every error keyed to it. The last entry is never removed.
    pub async fn remove_experience(&mut self, id: u32) -> bool {
        if !self.document.remove_experience(id) {
            return false;
        }
        self.errors.remove_prefixed(&experience_prefix(id));
        self.touch().await;
        true
    }

    pub async fn update_experience(
        &mut self,
        id: u32,
        field: ExperienceField,
        value: impl Into<String>,
    ) -> Result<(), AppError> {
        let value = value.into();
        let outcome = validate_experience(field, &value);
        self.document.update_experience(id, field, value)?;
        self.errors.set(experience_key(id, field), outcome);
        self.touch().await;
        Ok(())
    }

    pub async fn add_achievement(&mut self, exp_id: u32) -> Result<usize, AppError> {
        let index = self.document.add_achievement(exp_id)?;
        self.touch().await;
        Ok(index)
    }

    pub async fn update_achievement(
        &mut self,
        exp_id: u32,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), AppError> {
        self.document.update_achievement(exp_id, index, value)?;
        self.touch().await;
        Ok(())
    }

    pub async fn remove_achievement(&mut self, exp_id: u32, index: usize) -> Result<bool, AppError> {
        let removed = self.document.remove_achievement(exp_id, index)?;
        if removed {
            self.touch().await;
        }
        Ok(removed)
    }

    // ── education ──────────────────────────────────────────────────────────

    pub async fn add_education(&mut self) -> u32 {
        let id = self.document.add_education();
        self.touch().await;
        id
    }

    pub async fn remove_education(&mut self, id: u32) -> bool {
        if !self.document.remove_education(id) {
            return false;
        }
        self.errors.remove_prefixed(&education_prefix(id));
        self.touch().await;
        true
    }

    pub async fn update_education(
        &mut self,
        id: u32,
        field: EducationField,
        value: impl Into<String>,
    ) -> Result<(), AppError> {
        let value = value.into();
        let outcome = validate_education(field, &value);
        self.document.update_education(id, field, value)?;
        self.errors.set(education_key(id, field), outcome);
        self.touch().await;
        Ok(())
    }

    // ── skills ─────────────────────────────────────────────────────────────

    pub async fn add_skill(&mut self) -> usize {
        let index = self.document.add_skill();
        self.touch().await;
        index
    }

    pub async fn update_skill(&mut self, index: usize, value: impl Into<String>) -> Result<(), AppError> {
        self.document.update_skill(index, value)?;
        self.touch().await;
        Ok(())
    }

    pub async fn remove_skill(&mut self, index: usize) -> Result<bool, AppError> {
        let removed = self.document.remove_skill(index)?;
        if removed {
            self.touch().await;
        }
        Ok(removed)
    }

    // ── whole-session operations ───────────────────────────────────────────

    pub async fn switch_template(&mut self, template: TemplateDescriptor) {
        info!("Template switched to {} ({})", template.name, template.id);
        self.sink.notify(Notification::success(
            "TEMPLATE_SWITCHED",
            format!("Template switched to {}", template.name),
        ));
        self.template = Some(template);
        self.touch().await;
    }

    /// Back to the empty defaults and removes the stored draft. The selected template is kept.
    ///
    /// Nothing is saved until the next edit.
    pub async fn reset(&mut self) -> Result<(), AppError> {
        self.document.reset();
        self.errors.clear();
        if let Err(e) = self.autosaver.discard().await {
            return Err(self.report(e.into()));
        }
        self.sink
            .notify(Notification::info("DRAFT_RESET", "Form data has been reset"));
        Ok(())
    }

    /// Requests the preview screen.
    pub fn submit(&mut self) -> Result<PreviewRequest, AppError> {
        self.preview_request(false)
    }

    /// Requests the preview screen with the export starting on arrival.
    pub fn request_export(&mut self) -> Result<PreviewRequest, AppError> {
        self.preview_request(true)
    }

    /// Persists any pending autosave now. Call before dropping the session.
    pub async fn flush(&mut self) -> Result<(), AppError> {
        let flushed = self.autosaver.flush().await;
        flushed.map_err(|e| self.report(e.into()))
    }

    fn preview_request(&mut self, auto_export: bool) -> Result<PreviewRequest, AppError> {
        let Some(template) = self.template.clone() else {
            return Err(self.report(AppError::MissingTemplate));
        };
        if let Err(errors) = check_readiness(&self.document) {
            for key in errors.keys() {
                self.errors.set(key, errors.get(key).map(str::to_string));
            }
            let err = AppError::Validation(errors);
            if auto_export {
                return Err(self.report(err));
            }
            self.sink.notify(Notification::error(
                err.code(),
                "Please fix the errors before proceeding",
            ));
            return Err(err);
        }
        Ok(PreviewRequest {
            template,
            document: self.document.clone(),
            auto_export,
        })
    }

    fn report(&self, err: AppError) -> AppError {
        self.sink.notify(err.to_notification());
        err
    }

    async fn touch(&mut self) {
        let state = PersistedState::new(self.document.clone(), self.template.clone());
        self.autosaver.schedule(state).await;
    }
}

//! Location form: one create or edit session.
//!
//! The controller owns the mutable fields of a draft while its dialog is open,
//! runs logo uploads through the validation pipeline and finally produces a
//! [`SessionResult`]. Cancellation is its own variant, never an empty result.

use std::rc::Rc;

use crate::dialog::{DialogCloser, DialogConfig};
use crate::model::{Coordinates, LocationDraft, LocationType, LogoPayload, MarkerId};
use crate::validation::{ByteReader, FileValidationPipeline, ImageDecoder, ValidationOutcome, ValidationTask};

/// What a form session was opened for.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    /// New location at the clicked position
    Create { coordinates: Coordinates },
    /// Existing marker, seeded from its current draft
    Edit { marker: MarkerId, draft: LocationDraft },
}

/// A finalized form.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSubmission {
    /// The draft, including the logo payload chosen for saving.
    pub draft: LocationDraft,
}

/// How a form session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionResult {
    Submitted(LocationSubmission),
    Cancelled,
}

/// Errors that block finalizing a form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Receives user-visible alerts.
pub trait AlertSink {
    fn alert(&self, message: &str);
}

/// Form state for one location.
pub struct LocationFormController<R, D> {
    mode: FormMode,
    name: String,
    location_type: Option<LocationType>,
    coordinates: Option<Coordinates>,
    /// Logo that will be saved: the last accepted upload, or the carried-over one.
    logo: Option<LogoPayload>,
    logo_valid: bool,
    pipeline: FileValidationPipeline<R, D>,
    alerts: Rc<dyn AlertSink>,
}

impl<R, D> LocationFormController<R, D>
where
    R: ByteReader + Clone + 'static,
    R::Blob: 'static,
    D: ImageDecoder + Clone + 'static,
{
    pub fn new(mode: FormMode, pipeline: FileValidationPipeline<R, D>, alerts: Rc<dyn AlertSink>) -> Self {
        let (name, location_type, coordinates, logo) = match &mode {
            FormMode::Create { coordinates } => (String::new(), None, Some(*coordinates), None),
            FormMode::Edit { draft, .. } => (
                draft.name.clone(),
                Some(draft.location_type),
                Some(draft.coordinates),
                draft.logo.clone(),
            ),
        };

        Self {
            mode,
            name,
            location_type,
            coordinates,
            logo,
            logo_valid: true,
            pipeline,
            alerts,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn location_type(&self) -> Option<LocationType> {
        self.location_type
    }

    pub fn set_location_type(&mut self, location_type: Option<LocationType>) {
        self.location_type = location_type;
    }

    /// Choices offered by the type selector.
    pub fn location_types(&self) -> &'static [LocationType] {
        LocationType::all()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    pub fn set_coordinates(&mut self, coordinates: Option<Coordinates>) {
        self.coordinates = coordinates;
    }

    /// Logo payload that would be saved right now.
    pub fn logo(&self) -> Option<&LogoPayload> {
        self.logo.as_ref()
    }

    /// False after the latest upload was rejected.
    pub fn is_logo_valid(&self) -> bool {
        self.logo_valid
    }

    /// Required fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.coordinates.is_none() {
            missing.push("coordinates");
        }
        if self.location_type.is_none() {
            missing.push("type");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Start validating a logo selection. Any upload still running is abandoned.
    pub fn begin_logo_upload<I>(&mut self, files: I) -> Option<ValidationTask>
    where
        I: IntoIterator<Item = R::Blob>,
    {
        self.pipeline.start(files)
    }

    /// Apply the result of upload run `run`.
    ///
    /// Aborted runs and runs superseded by a newer upload are ignored.
    /// Returns whether the outcome was applied.
    pub fn apply_logo_outcome(&mut self, run: u64, outcome: Option<ValidationOutcome>) -> bool {
        if run != self.pipeline.last_run() {
            log::debug!(
                "🖼️ Ignoring result of run {}, latest is {}",
                run,
                self.pipeline.last_run()
            );
            return false;
        }
        let Some(outcome) = outcome else {
            return false;
        };

        match outcome {
            ValidationOutcome::Accepted { file, payload } => {
                log::debug!("🖼️ Logo {} ready to save", file.name);
                self.logo = Some(payload);
                self.logo_valid = true;
            }
            ValidationOutcome::Rejected { file, message, .. } => {
                log::debug!("🖼️ Keeping previous logo, {} was rejected", file.name);
                self.logo_valid = false;
                self.alerts.alert(&message);
            }
        }
        true
    }

    /// Validate a logo selection and apply the outcome.
    pub async fn upload_logo<I>(&mut self, files: I) -> Option<ValidationOutcome>
    where
        I: IntoIterator<Item = R::Blob>,
    {
        let task = self.begin_logo_upload(files)?;
        let run = task.run();
        let outcome = task.await;
        self.apply_logo_outcome(run, outcome.clone());
        outcome
    }

    /// Produce the finalized draft, or the first missing required field.
    pub fn finalize(&self) -> Result<LocationSubmission, FormError> {
        if let Some(field) = self.missing_fields().first() {
            return Err(FormError::MissingField(*field));
        }
        let (Some(location_type), Some(coordinates)) = (self.location_type, self.coordinates) else {
            return Err(FormError::MissingField("type"));
        };

        let mut draft = LocationDraft::new(self.name.trim(), location_type, coordinates);
        draft.logo = self.logo.clone();
        Ok(LocationSubmission { draft })
    }

    /// End the session without a result.
    pub fn cancel(&mut self) -> SessionResult {
        self.pipeline.cancel();
        SessionResult::Cancelled
    }
}

/// A form hosted in an open dialog.
pub struct FormDialog<R, D> {
    form: LocationFormController<R, D>,
    closer: Option<DialogCloser>,
}

impl<R, D> FormDialog<R, D>
where
    R: ByteReader + Clone + 'static,
    R::Blob: 'static,
    D: ImageDecoder + Clone + 'static,
{
    /// Host a new form for a dialog opened with `config`.
    pub fn new(
        config: DialogConfig,
        closer: DialogCloser,
        pipeline: FileValidationPipeline<R, D>,
        alerts: Rc<dyn AlertSink>,
    ) -> Self {
        Self {
            form: LocationFormController::new(config.data, pipeline, alerts),
            closer: Some(closer),
        }
    }

    pub fn form(&self) -> &LocationFormController<R, D> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut LocationFormController<R, D> {
        &mut self.form
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_none()
    }

    /// Finalize and close with the submission. On error the dialog stays open.
    pub fn save(&mut self) -> Result<(), FormError> {
        let submission = self.form.finalize()?;
        if let Some(closer) = self.closer.take() {
            log::debug!("💬 Saving {:?}", submission.draft.name);
            closer.close(SessionResult::Submitted(submission));
        }
        Ok(())
    }

    /// Close without a result.
    pub fn cancel(&mut self) {
        let result = self.form.cancel();
        if let Some(closer) = self.closer.take() {
            closer.close(result);
        }
    }
}

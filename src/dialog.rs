//! Dialog presenter contract.
//!
//! Opening a dialog yields a [`DialogHandle`] whose close event fires exactly
//! once. The presenter keeps the matching [`DialogCloser`] and hands it to
//! whatever hosts the form. A closer dropped without closing counts as a
//! cancellation, so a torn-down dialog can never leave its caller waiting.

use futures::channel::oneshot;
use serde::{Deserialize, Serialize};

use crate::constants::dialog;
use crate::form::{FormMode, SessionResult};

/// Which component a dialog hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    LocationForm,
}

/// Dialog sizing and focus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogSettings {
    #[serde(default = "default_width")]
    pub width: String,
    #[serde(default = "default_min_width")]
    pub min_width: String,
    /// Focus the first field when a create dialog opens
    #[serde(default)]
    pub auto_focus_create: bool,
    /// Focus the first field when an edit dialog opens
    #[serde(default = "default_auto_focus_edit")]
    pub auto_focus_edit: bool,
}

fn default_width() -> String {
    dialog::WIDTH.to_string()
}

fn default_min_width() -> String {
    dialog::MIN_WIDTH.to_string()
}

fn default_auto_focus_edit() -> bool {
    true
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            min_width: default_min_width(),
            auto_focus_create: false,
            auto_focus_edit: default_auto_focus_edit(),
        }
    }
}

impl DialogSettings {
    /// Build the config for a form dialog in the given mode.
    pub fn config_for(&self, data: FormMode) -> DialogConfig {
        let auto_focus = match data {
            FormMode::Create { .. } => self.auto_focus_create,
            FormMode::Edit { .. } => self.auto_focus_edit,
        };
        DialogConfig {
            data,
            width: self.width.clone(),
            min_width: self.min_width.clone(),
            auto_focus,
        }
    }
}

/// Everything a presenter needs to open one dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogConfig {
    pub data: FormMode,
    pub width: String,
    pub min_width: String,
    pub auto_focus: bool,
}

/// Shows dialogs. Presentation and layout are up to the implementor.
pub trait DialogPresenter {
    fn open(&mut self, kind: DialogKind, config: DialogConfig) -> DialogHandle;
}

/// Create a connected closer/handle pair.
pub fn channel() -> (DialogCloser, DialogHandle) {
    let (tx, rx) = oneshot::channel();
    (DialogCloser { tx }, DialogHandle { rx })
}

/// Sending half: closes the dialog with a result.
#[derive(Debug)]
pub struct DialogCloser {
    tx: oneshot::Sender<SessionResult>,
}

impl DialogCloser {
    /// Close the dialog. Consumes the closer, so a dialog closes at most once.
    pub fn close(self, result: SessionResult) {
        if self.tx.send(result).is_err() {
            log::debug!("💬 Dialog closed after its caller went away");
        }
    }
}

/// Receiving half: yields the close event.
#[derive(Debug)]
pub struct DialogHandle {
    rx: oneshot::Receiver<SessionResult>,
}

impl DialogHandle {
    /// Check for the close event without waiting.
    ///
    /// Returns `None` while the dialog is still open. A closer dropped without
    /// closing yields [`SessionResult::Cancelled`].
    pub fn try_closed(&mut self) -> Option<SessionResult> {
        match self.rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::Canceled) => Some(SessionResult::Cancelled),
        }
    }

    /// Wait for the close event.
    pub async fn closed(self) -> SessionResult {
        self.rx.await.unwrap_or(SessionResult::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::LocationSubmission;
    use crate::model::{Coordinates, LocationDraft, LocationType};

    #[test]
    fn test_open_handle_reports_nothing() {
        let (_closer, mut handle) = channel();
        assert_eq!(handle.try_closed(), None);
    }

    #[test]
    fn test_close_delivers_result() {
        let (closer, mut handle) = channel();
        let draft = LocationDraft::new("Cafe", LocationType::Business, Coordinates::new(1.0, 2.0));
        closer.close(SessionResult::Submitted(LocationSubmission { draft: draft.clone() }));

        assert_eq!(
            handle.try_closed(),
            Some(SessionResult::Submitted(LocationSubmission { draft }))
        );
    }

    #[test]
    fn test_dropped_closer_is_cancellation() {
        let (closer, handle) = channel();
        drop(closer);
        assert_eq!(pollster::block_on(handle.closed()), SessionResult::Cancelled);
    }

    #[test]
    fn test_config_for_mode() {
        let settings = DialogSettings::default();

        let create = settings.config_for(FormMode::Create {
            coordinates: Coordinates::new(0.0, 0.0),
        });
        assert_eq!(create.width, "40vw");
        assert_eq!(create.min_width, "340px");
        assert!(!create.auto_focus);

        let draft = LocationDraft::new("Home", LocationType::Home, Coordinates::new(0.0, 0.0));
        let edit = settings.config_for(FormMode::Edit {
            marker: crate::model::MarkerId::new(1),
            draft,
        });
        assert!(edit.auto_focus);
    }
}

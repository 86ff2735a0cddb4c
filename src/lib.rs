//! Placemark - map location annotation
//!
//! Double-click the map to open a location form, fill in name, type and an
//! optional logo, and get a marker with a popup that can edit or delete it.
//!
//! The map engine and the dialog UI are supplied by the host through
//! [`map::MapSurface`] and [`dialog::DialogPresenter`]. The [`headless`] module
//! has in-memory versions of both.

pub mod config;
pub mod constants;
pub mod controller;
pub mod dialog;
pub mod form;
pub mod headless;
pub mod map;
pub mod model;
pub mod popup;
pub mod registry;
pub mod validation;

pub use config::AppConfig;
pub use controller::{AnnotationError, AnnotationEvent, EditPolicy, MapAnnotationController};
pub use form::{FormDialog, LocationFormController, SessionResult};
pub use popup::PopupFactory;
pub use validation::{FileValidationPipeline, ValidationOutcome};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;

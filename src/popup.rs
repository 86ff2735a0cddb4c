//! Popup and glyph construction for markers.
//!
//! The factory produces plain data: the map host decides how to render it,
//! either from the structured rows and buttons or from [`PopupContent::to_html`].
//! Each button carries the [`PopupAction`] it triggers, and every action names
//! the marker it was built for.

use std::borrow::Cow;
use std::fmt::Write as _;

use quick_xml::escape::escape;

use crate::constants::{REGULAR_LOCATION_SVG, popup};
use crate::map::OverlayMarker;
use crate::model::{Coordinates, LocationDraft, LogoPayload, MarkerId};

/// Action fired by a popup button, bound to one marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupAction {
    Edit(MarkerId),
    Delete(MarkerId),
}

impl PopupAction {
    pub fn marker(&self) -> MarkerId {
        match self {
            PopupAction::Edit(id) | PopupAction::Delete(id) => *id,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PopupAction::Edit(_) => "edit",
            PopupAction::Delete(_) => "delete",
        }
    }
}

/// One labeled line in the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

impl DetailRow {
    /// Row text as shown to the user.
    pub fn text(&self) -> String {
        format!("{}:{}", self.label, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupButton {
    pub label: &'static str,
    pub class: &'static str,
    pub action: PopupAction,
}

/// Static popup content for one marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
    pub rows: Vec<DetailRow>,
    pub buttons: Vec<PopupButton>,
}

impl PopupContent {
    /// Find the button with the given label.
    pub fn button(&self, label: &str) -> Option<&PopupButton> {
        self.buttons.iter().find(|b| b.label == label)
    }

    /// Render the popup as an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut html = format!("<div class=\"{}\">", popup::CONTENT_CLASS);
        for row in &self.rows {
            let _ = write!(
                html,
                "<div class=\"{}\">{}</div>",
                popup::DETAIL_ROW_CLASS,
                escape(&row.text())
            );
        }
        let _ = write!(html, "<div class=\"{}\">", popup::BUTTON_WRAPPER_CLASS);
        for button in &self.buttons {
            let _ = write!(
                html,
                "<button type=\"button\" class=\"{}\" data-action=\"{}\" data-marker=\"{}\">{}</button>",
                button.class,
                button.action.name(),
                button.action.marker().get(),
                button.label
            );
        }
        html.push_str("</div></div>");
        html
    }
}

/// The marker glyph itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerGlyph {
    /// Regular location pin
    Default,
    /// The location's uploaded logo
    Logo(LogoPayload),
}

impl MarkerGlyph {
    pub fn html(&self) -> Cow<'static, str> {
        match self {
            MarkerGlyph::Default => Cow::Borrowed(REGULAR_LOCATION_SVG),
            MarkerGlyph::Logo(logo) => Cow::Owned(format!(
                "<img src=\"{}\" alt=\"\" class=\"{}\">",
                escape(logo.as_str()),
                popup::LOGO_CLASS
            )),
        }
    }
}

/// Builds popups, glyphs and overlay markers from finalized drafts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PopupFactory;

impl PopupFactory {
    pub fn new() -> Self {
        Self
    }

    /// Pick the glyph: the logo if there is one, else the default pin.
    pub fn glyph(&self, draft: &LocationDraft) -> MarkerGlyph {
        match &draft.logo {
            Some(logo) => MarkerGlyph::Logo(logo.clone()),
            None => MarkerGlyph::Default,
        }
    }

    /// Build the popup content for `marker`.
    pub fn build(&self, marker: MarkerId, draft: &LocationDraft) -> PopupContent {
        PopupContent {
            rows: vec![
                DetailRow {
                    label: popup::NAME_LABEL,
                    value: draft.name.clone(),
                },
                DetailRow {
                    label: popup::TYPE_LABEL,
                    value: draft.location_type.to_string(),
                },
                DetailRow {
                    label: popup::COORDINATES_LABEL,
                    value: draft.coordinates.to_string(),
                },
            ],
            buttons: vec![
                PopupButton {
                    label: "Edit",
                    class: popup::EDIT_BUTTON_CLASS,
                    action: PopupAction::Edit(marker),
                },
                PopupButton {
                    label: "Delete",
                    class: popup::DELETE_BUTTON_CLASS,
                    action: PopupAction::Delete(marker),
                },
            ],
        }
    }

    /// A bare default pin with no details or actions.
    pub fn center_marker(&self, marker: MarkerId, coordinates: Coordinates) -> OverlayMarker {
        OverlayMarker {
            marker,
            coordinates,
            glyph: MarkerGlyph::Default,
            popup: PopupContent {
                rows: Vec::new(),
                buttons: Vec::new(),
            },
            tooltip: String::new(),
            title: String::new(),
        }
    }

    /// Assemble the full overlay marker for `marker`.
    pub fn overlay(&self, marker: MarkerId, draft: &LocationDraft) -> OverlayMarker {
        OverlayMarker {
            marker,
            coordinates: draft.coordinates,
            glyph: self.glyph(draft),
            popup: self.build(marker, draft),
            tooltip: draft.name.clone(),
            title: draft.name.clone(),
        }
    }
}

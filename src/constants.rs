//! Global constants for the Placemark application

/// Bytes per kilobyte used by the logo size check
pub const BYTES_PER_KB: f64 = 1024.0;

/// Smallest accepted logo size in kilobytes (inclusive)
pub const LOGO_MIN_KB: f64 = 1.0;

/// Largest accepted logo size in kilobytes (inclusive)
pub const LOGO_MAX_KB: f64 = 100.0;

/// MIME type reported for blobs that declare none
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// User-facing rejection messages
pub mod messages {
    pub const INVALID_FILE: &str = "Invalid file.";
    pub const INVALID_IMAGE: &str = "Invalid image.";
    pub const INVALID_SIZE: &str = "Invalid size.";
}

/// Dialog sizing defaults
pub mod dialog {
    pub const WIDTH: &str = "40vw";
    pub const MIN_WIDTH: &str = "340px";
}

/// Default map view
pub mod map {
    /// Initial map center (latitude, longitude)
    pub const CENTER: (f64, f64) = (51.2404030496661, -0.6119522539693528);
    pub const ZOOM: f64 = 14.0;
    pub const MAX_ZOOM: f64 = 19.0;
    pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
    pub const ATTRIBUTION: &str =
        "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
}

/// Popup markup: CSS classes and labels
pub mod popup {
    pub const CONTENT_CLASS: &str = "popup-content";
    pub const DETAIL_ROW_CLASS: &str = "detail-row";
    pub const BUTTON_WRAPPER_CLASS: &str = "popup-btn-wrapper";
    pub const EDIT_BUTTON_CLASS: &str = "primary";
    pub const DELETE_BUTTON_CLASS: &str = "secondary";
    pub const LOGO_CLASS: &str = "uploaded-logo";

    pub const NAME_LABEL: &str = "Location Name";
    pub const TYPE_LABEL: &str = "Location Type";
    pub const COORDINATES_LABEL: &str = "Location Coordinates";
}

/// Glyph shown for markers without a logo
pub const REGULAR_LOCATION_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" height="24px" viewBox="0 0 24 24" width="24px" class="regular-loc"><path d="M0 0h24v24H0z" fill="none"/><path d="M12 2C8.13 2 5 5.13 5 9c0 5.25 7 13 7 13s7-7.75 7-13c0-3.87-3.13-7-7-7zm0 9.5c-1.38 0-2.5-1.12-2.5-2.5s1.12-2.5 2.5-2.5 2.5 1.12 2.5 2.5-1.12 2.5-2.5 2.5z"/></svg>"#;

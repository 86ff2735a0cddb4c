//! Location data model: type catalogue, coordinates, logo payload and drafts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of place a location describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationType {
    Home,
    Business,
    Event,
}

impl LocationType {
    /// Get the display name for this location type.
    pub fn name(&self) -> &'static str {
        match self {
            LocationType::Home => "Home",
            LocationType::Business => "Business",
            LocationType::Event => "Event",
        }
    }

    /// Get all location types in the order the form lists them.
    pub fn all() -> &'static [LocationType] {
        &[
            LocationType::Home,
            LocationType::Business,
            LocationType::Event,
        ]
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no known location type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown location type: {0}")]
pub struct UnknownLocationType(pub String);

impl FromStr for LocationType {
    type Err = UnknownLocationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        LocationType::all()
            .iter()
            .copied()
            .find(|ty| ty.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownLocationType(trimmed.to_string()))
    }
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

/// Encoded logo image attached to a location.
///
/// Only produced by a successful validation run. The payload is a
/// `data:` URL so it can be dropped straight into an `<img src>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoPayload {
    data_url: String,
    /// Set when the payload passed the image decode stage.
    decoded: bool,
}

impl LogoPayload {
    pub fn new(data_url: impl Into<String>, decoded: bool) -> Self {
        Self {
            data_url: data_url.into(),
            decoded,
        }
    }

    /// The encoded payload as a `data:` URL.
    pub fn as_str(&self) -> &str {
        &self.data_url
    }

    /// Whether the payload was verified to decode as an image.
    pub fn is_decoded(&self) -> bool {
        self.decoded
    }

    /// MIME type declared in the data URL header, if any.
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.data_url.strip_prefix("data:")?.split(',').next()?;
        header.split(';').next().filter(|mime| !mime.is_empty())
    }
}

/// A finalized set of location details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDraft {
    pub name: String,
    pub location_type: LocationType,
    pub coordinates: Coordinates,
    pub logo: Option<LogoPayload>,
}

impl LocationDraft {
    pub fn new(name: impl Into<String>, location_type: LocationType, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            location_type,
            coordinates,
            logo: None,
        }
    }

    /// Attach a logo payload.
    pub fn with_logo(mut self, logo: LogoPayload) -> Self {
        self.logo = Some(logo);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_type_parse() {
        assert_eq!("Home".parse::<LocationType>(), Ok(LocationType::Home));
        assert_eq!(" business ".parse::<LocationType>(), Ok(LocationType::Business));
        assert_eq!("EVENT".parse::<LocationType>(), Ok(LocationType::Event));
        assert_eq!(
            "Castle".parse::<LocationType>(),
            Err(UnknownLocationType("Castle".to_string()))
        );
    }

    #[test]
    fn test_location_type_catalogue() {
        let names: Vec<_> = LocationType::all().iter().map(|ty| ty.name()).collect();
        assert_eq!(names, vec!["Home", "Business", "Event"]);
    }

    #[test]
    fn test_coordinates_display() {
        assert_eq!(Coordinates::new(51.24, -0.61).to_string(), "51.24, -0.61");
        assert_eq!(Coordinates::from((1.5, 2.0)).to_string(), "1.5, 2");
    }

    #[test]
    fn test_logo_payload_mime_type() {
        let logo = LogoPayload::new("data:image/png;base64,AAAA", true);
        assert_eq!(logo.mime_type(), Some("image/png"));
        assert!(logo.is_decoded());

        let untyped = LogoPayload::new("data:;base64,AAAA", false);
        assert_eq!(untyped.mime_type(), None);

        let bogus = LogoPayload::new("not a data url", false);
        assert_eq!(bogus.mime_type(), None);
    }

    #[test]
    fn test_draft_with_logo() {
        let draft = LocationDraft::new("Cafe", LocationType::Business, Coordinates::new(1.0, 2.0));
        assert!(draft.logo.is_none());

        let draft = draft.with_logo(LogoPayload::new("data:image/png;base64,AAAA", true));
        assert_eq!(draft.logo.as_ref().map(LogoPayload::as_str), Some("data:image/png;base64,AAAA"));
    }
}

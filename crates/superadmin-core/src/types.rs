//! Wire and domain types for the hotel super-admin API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier the server assigns to a hotel admin
pub type AdminId = i64;

/// Identifier the server assigns to a carousel image
pub type CarouselImageId = i64;

/// Registration status of a hotel admin
///
/// Only one status-filtered list is ever observed at a time, so the status is
/// implied by the endpoint that returned the record rather than carried on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    /// Awaiting a decision
    Pending,
    /// Allowed to manage hotels
    Approved,
    /// Registration refused
    Rejected,
}

impl AdminStatus {
    /// Whether a decision has already been taken
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        })
    }
}

impl std::str::FromStr for AdminStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(crate::Error::validation(
                "status",
                format!("expected pending, approved or rejected, got '{s}'"),
            )),
        }
    }
}

/// A hotel admin registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HotelAdmin {
    /// Server identity
    #[serde(deserialize_with = "crate::wire::id")]
    pub admin_id: AdminId,
    /// Display name
    #[serde(default, deserialize_with = "crate::wire::text")]
    pub admin_name: String,
    /// Contact email, also the admin's login identity
    #[serde(default, deserialize_with = "crate::wire::text")]
    pub admin_email: String,
    /// Contact phone number
    #[serde(default, deserialize_with = "crate::wire::text")]
    pub admin_phone_number: String,
}

/// One amenity as it arrives on the wire
///
/// The backend sends either a bare name or an object carrying one. Nothing
/// past [`crate::hotel::normalize_hotel`] sees this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AmenityEntry {
    /// `"wifi"`
    Name(String),
    /// `{"name": "wifi", ...}`
    Object {
        /// Amenity name
        name: String,
    },
}

impl AmenityEntry {
    /// The canonical string form
    pub fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Object { name } => name,
        }
    }
}

/// A hotel record exactly as the server sends it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawHotel {
    /// Numeric identity, preferred over `id`
    #[serde(default)]
    pub hotel_id: Option<serde_json::Value>,
    /// Fallback identity
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// Hotel name
    #[serde(default, deserialize_with = "crate::wire::optional_text")]
    pub hotel_name: Option<String>,
    /// Street address
    #[serde(default, deserialize_with = "crate::wire::optional_text")]
    pub hotel_address: Option<String>,
    /// Phone number
    #[serde(default, deserialize_with = "crate::wire::optional_text")]
    pub hotel_phone_number: Option<String>,
    /// Contact email
    #[serde(default, deserialize_with = "crate::wire::optional_text")]
    pub hotel_email: Option<String>,
    /// Free-text description
    #[serde(default, deserialize_with = "crate::wire::optional_text")]
    pub hotel_description: Option<String>,
    /// Star rating
    #[serde(default, deserialize_with = "crate::wire::optional_number")]
    pub hotel_rating: Option<f64>,
    /// District name
    #[serde(default, deserialize_with = "crate::wire::optional_text")]
    pub district: Option<String>,
    /// Base price per night
    #[serde(default, deserialize_with = "crate::wire::optional_number")]
    pub hotel_basic_price_per_night: Option<f64>,
    /// Hotel type
    #[serde(default, deserialize_with = "crate::wire::optional_text")]
    pub hotel_type_name: Option<String>,
    /// Landscape type
    #[serde(default, deserialize_with = "crate::wire::optional_text")]
    pub landscape_type_name: Option<String>,
    /// Creation timestamp (string or epoch milliseconds)
    #[serde(default)]
    pub created_at: Option<serde_json::Value>,
    /// Last update timestamp (string or epoch milliseconds)
    #[serde(default)]
    pub updated_at: Option<serde_json::Value>,
    /// Amenities in either wire form
    #[serde(default, deserialize_with = "crate::wire::optional_list")]
    pub amenities: Option<Vec<AmenityEntry>>,
    /// Uploaded images as base64 JPEG payloads
    #[serde(default, deserialize_with = "crate::wire::optional_list")]
    pub hotel_image_upload_base64: Option<Vec<String>>,
    /// Already hosted image URLs
    #[serde(default, deserialize_with = "crate::wire::optional_list")]
    pub hotel_image_urls: Option<Vec<String>>,
}

/// A normalized hotel, the only form views work with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    /// Stable key for rendering and update addressing
    pub id: String,
    /// Hotel name
    pub hotel_name: String,
    /// Street address
    pub hotel_address: String,
    /// Phone number
    pub hotel_phone_number: String,
    /// Contact email
    pub hotel_email: String,
    /// Free-text description
    pub hotel_description: Option<String>,
    /// Star rating
    pub hotel_rating: Option<f64>,
    /// District name
    pub district: Option<String>,
    /// Base price per night
    pub hotel_basic_price_per_night: Option<f64>,
    /// Hotel type
    pub hotel_type_name: Option<String>,
    /// Landscape type
    pub landscape_type_name: Option<String>,
    /// Creation time; the normalization instant when the server sent none
    pub created_at: DateTime<Utc>,
    /// Last update; `None` means never updated
    pub updated_at: Option<DateTime<Utc>>,
    /// Amenity names
    pub amenities: Vec<String>,
    /// Uploaded images as base64 JPEG payloads
    pub hotel_image_upload_base64: Vec<String>,
    /// Already hosted image URLs
    pub hotel_image_urls: Vec<String>,
}

/// Display state of a carousel image
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CarouselState {
    /// Shown on the homepage
    #[serde(alias = "ACTIVE", alias = "active")]
    Active,
    /// Kept but hidden
    #[serde(alias = "INACTIVE", alias = "inactive")]
    Inactive,
}

impl CarouselState {
    /// The state a toggle moves to
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }

    /// Query-parameter form
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl std::fmt::Display for CarouselState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for CarouselState {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        if s.eq_ignore_ascii_case("active") {
            Ok(Self::Active)
        } else if s.eq_ignore_ascii_case("inactive") {
            Ok(Self::Inactive)
        } else {
            Err(crate::Error::validation(
                "state",
                format!("expected Active or Inactive, got '{s}'"),
            ))
        }
    }
}

/// A homepage carousel image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CarouselImage {
    /// Server identity
    #[serde(deserialize_with = "crate::wire::id")]
    pub carousel_image_id: CarouselImageId,
    /// Base64 JPEG payload produced by the server
    #[serde(
        default,
        deserialize_with = "crate::wire::text",
        alias = "image",
        alias = "imageData",
        alias = "carouselImage"
    )]
    pub carousel_image_base64: String,
    /// Display state
    #[serde(alias = "carouselImageState", alias = "imageState")]
    pub state: CarouselState,
}

impl CarouselImage {
    /// Data URI for display
    pub fn data_uri(&self) -> String {
        jpeg_data_uri(&self.carousel_image_base64)
    }

    /// Whether the image is shown on the homepage
    pub fn is_active(&self) -> bool {
        self.state == CarouselState::Active
    }
}

/// One district as it arrives on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DistrictEntry {
    /// `"Colombo"`
    Name(String),
    /// `{"name": "Colombo", ...}`
    Object {
        /// District name
        name: String,
    },
}

impl DistrictEntry {
    /// The district name
    pub fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Object { name } => name,
        }
    }
}

/// Wrap a base64 JPEG payload as a data URI
pub fn jpeg_data_uri(base64: &str) -> String {
    format!("data:image/jpeg;base64,{base64}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_admin_deserialization() {
        let admin: HotelAdmin = serde_json::from_value(json!({
            "adminId": 3,
            "adminName": "Mike Chen",
            "adminEmail": "mike@mountainlodge.com",
            "adminPhoneNumber": "+1234567892",
            "extra": true
        }))
        .unwrap();

        assert_eq!(admin.admin_id, 3);
        assert_eq!(admin.admin_name, "Mike Chen");
        assert_eq!(admin.admin_phone_number, "+1234567892");
    }

    #[test]
    fn test_admin_with_loose_fields() {
        let admin: HotelAdmin = serde_json::from_value(json!({
            "adminId": "8",
            "adminName": null,
            "adminPhoneNumber": 771_234_567
        }))
        .unwrap();

        assert_eq!(admin.admin_id, 8);
        assert_eq!(admin.admin_name, "");
        assert_eq!(admin.admin_email, "");
        assert_eq!(admin.admin_phone_number, "771234567");
        assert!(serde_json::from_value::<HotelAdmin>(json!({"adminEmail": "x@y"})).is_err());
    }

    #[test]
    fn test_amenity_entry_forms() {
        let entries: Vec<AmenityEntry> =
            serde_json::from_value(json!(["wifi", {"name": "pool", "id": 4}])).unwrap();
        let names: Vec<String> = entries.into_iter().map(AmenityEntry::into_name).collect();
        assert_eq!(names, vec!["wifi", "pool"]);
    }

    #[test]
    fn test_carousel_state_toggle() {
        assert_eq!(CarouselState::Active.toggled(), CarouselState::Inactive);
        assert_eq!(CarouselState::Inactive.toggled(), CarouselState::Active);
        assert_eq!(CarouselState::Inactive.to_string(), "Inactive");
    }

    #[test]
    fn test_carousel_state_parse() {
        assert_eq!("active".parse::<CarouselState>().unwrap(), CarouselState::Active);
        assert_eq!("INACTIVE".parse::<CarouselState>().unwrap(), CarouselState::Inactive);
        assert!("paused".parse::<CarouselState>().is_err());
    }

    #[test]
    fn test_carousel_image_aliases() {
        let image: CarouselImage = serde_json::from_value(json!({
            "carouselImageId": 5,
            "image": "AAAA",
            "carouselImageState": "Inactive"
        }))
        .unwrap();

        assert_eq!(image.carousel_image_id, 5);
        assert!(!image.is_active());
        assert_eq!(image.data_uri(), "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_admin_status() {
        assert!(!AdminStatus::Pending.is_terminal());
        assert!(AdminStatus::Approved.is_terminal());
        assert!(AdminStatus::Rejected.is_terminal());
        assert_eq!(AdminStatus::Rejected.to_string(), "rejected");
        assert_eq!("Approved".parse::<AdminStatus>().unwrap(), AdminStatus::Approved);
        assert_eq!(" pending ".parse::<AdminStatus>().unwrap(), AdminStatus::Pending);
        assert!("active".parse::<AdminStatus>().is_err());
    }
}

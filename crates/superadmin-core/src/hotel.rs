//! Hotel normalization and client-side filtering

use crate::types::{AmenityEntry, Hotel, RawHotel, jpeg_data_uri};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Sentinel shown first in the district picker; selecting it means no filter
pub const ALL_DISTRICTS: &str = "All Districts";

/// Text rendered for a hotel that has never been updated
pub const NOT_UPDATED: &str = "Not updated yet";

/// Turn a wire hotel into the canonical form
///
/// `id` is `hotelId` stringified, falling back to `id`. A missing or
/// unparseable `createdAt` becomes `now`; a missing `updatedAt` stays `None`.
/// Amenities are reduced to their names whichever wire form they used.
pub fn normalize_hotel(raw: RawHotel, now: DateTime<Utc>) -> Hotel {
    let id = raw
        .hotel_id
        .as_ref()
        .and_then(stringify_id)
        .or_else(|| raw.id.as_ref().and_then(stringify_id))
        .unwrap_or_default();

    Hotel {
        id,
        hotel_name: raw.hotel_name.unwrap_or_default(),
        hotel_address: raw.hotel_address.unwrap_or_default(),
        hotel_phone_number: raw.hotel_phone_number.unwrap_or_default(),
        hotel_email: raw.hotel_email.unwrap_or_default(),
        hotel_description: raw.hotel_description,
        hotel_rating: raw.hotel_rating,
        district: raw.district,
        hotel_basic_price_per_night: raw.hotel_basic_price_per_night,
        hotel_type_name: raw.hotel_type_name,
        landscape_type_name: raw.landscape_type_name,
        created_at: raw.created_at.as_ref().and_then(parse_timestamp).unwrap_or(now),
        updated_at: raw.updated_at.as_ref().and_then(parse_timestamp),
        amenities: raw
            .amenities
            .unwrap_or_default()
            .into_iter()
            .map(AmenityEntry::into_name)
            .collect(),
        hotel_image_upload_base64: raw.hotel_image_upload_base64.unwrap_or_default(),
        hotel_image_urls: raw.hotel_image_urls.unwrap_or_default(),
    }
}

/// Normalize a batch, stamping every missing `createdAt` with the same instant
pub fn normalize_hotels(raw: Vec<RawHotel>) -> Vec<Hotel> {
    let now = Utc::now();
    raw.into_iter().map(|h| normalize_hotel(h, now)).collect()
}

/// Hotels whose name or address contains `search_term`, ignoring case
///
/// The term is trimmed first; an empty term matches everything. The result
/// is a lazy view over `hotels` that preserves input order and can be cloned
/// to iterate again.
pub fn filter_hotels<'a>(
    hotels: &'a [Hotel],
    search_term: &str,
) -> impl Iterator<Item = &'a Hotel> + Clone + use<'a> {
    let needle = search_term.trim().to_lowercase();
    hotels.iter().filter(move |hotel| hotel.matches_lowercase(&needle))
}

/// Keep hotels in `district`, ignoring case; [`ALL_DISTRICTS`] keeps everything
pub fn filter_by_district(hotels: Vec<Hotel>, district: &str) -> Vec<Hotel> {
    if district == ALL_DISTRICTS {
        return hotels;
    }
    let wanted = district.to_lowercase();
    hotels
        .into_iter()
        .filter(|h| h.district.as_deref().unwrap_or_default().to_lowercase() == wanted)
        .collect()
}

/// Render a timestamp for display
pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp.map_or_else(
        || NOT_UPDATED.to_string(),
        |ts| ts.format("%b %-d, %Y, %I:%M:%S %p").to_string(),
    )
}

/// Fields an operator may change on a hotel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotelEdit {
    /// New name
    pub hotel_name: Option<String>,
    /// New address
    pub hotel_address: Option<String>,
    /// New phone number
    pub hotel_phone_number: Option<String>,
    /// New email
    pub hotel_email: Option<String>,
    /// New description
    pub hotel_description: Option<String>,
    /// New base price
    pub hotel_basic_price_per_night: Option<f64>,
    /// Replacement amenity list
    pub amenities: Option<Vec<String>>,
}

/// Apply an edit to the hotel with `id`, stamping `updated_at`
///
/// Returns whether a hotel with that id was found.
pub fn apply_local_edit(hotels: &mut [Hotel], id: &str, edit: HotelEdit, now: DateTime<Utc>) -> bool {
    let Some(hotel) = hotels.iter_mut().find(|h| h.id == id) else {
        return false;
    };

    if let Some(name) = edit.hotel_name {
        hotel.hotel_name = name;
    }
    if let Some(address) = edit.hotel_address {
        hotel.hotel_address = address;
    }
    if let Some(phone) = edit.hotel_phone_number {
        hotel.hotel_phone_number = phone;
    }
    if let Some(email) = edit.hotel_email {
        hotel.hotel_email = email;
    }
    if let Some(description) = edit.hotel_description {
        hotel.hotel_description = Some(description);
    }
    if let Some(price) = edit.hotel_basic_price_per_night {
        hotel.hotel_basic_price_per_night = Some(price);
    }
    if let Some(amenities) = edit.amenities {
        hotel.amenities = amenities;
    }
    hotel.updated_at = Some(now);
    true
}

impl Hotel {
    /// Case-insensitive substring match on name or address
    pub fn matches(&self, search_term: &str) -> bool {
        self.matches_lowercase(&search_term.trim().to_lowercase())
    }

    fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.hotel_name.to_lowercase().contains(needle)
            || self.hotel_address.to_lowercase().contains(needle)
    }

    /// All images for display, uploads first, then hosted URLs
    pub fn display_images(&self) -> Vec<String> {
        self.hotel_image_upload_base64
            .iter()
            .map(|b64| jpeg_data_uri(b64))
            .chain(self.hotel_image_urls.iter().cloned())
            .collect()
    }

    /// Amenity names joined for a single line
    pub fn amenity_summary(&self) -> String {
        self.amenities.join(", ")
    }
}

fn stringify_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Parse a server timestamp
///
/// Accepts RFC 3339, zone-less ISO date-times (taken as UTC), plain dates and
/// epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn raw(value: Value) -> RawHotel {
        serde_json::from_value(value).unwrap()
    }

    fn hotel(name: &str, address: &str) -> Hotel {
        normalize_hotel(
            raw(json!({"hotelId": 1, "hotelName": name, "hotelAddress": address})),
            Utc::now(),
        )
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_mixed_amenities_and_numeric_id() {
        let hotel = normalize_hotel(
            raw(json!({"hotelId": 7, "amenities": ["wifi", {"name": "pool"}]})),
            fixed_now(),
        );
        assert_eq!(hotel.id, "7");
        assert_eq!(hotel.amenities, vec!["wifi", "pool"]);
    }

    #[test]
    fn test_id_falls_back_to_id_field() {
        let hotel = normalize_hotel(raw(json!({"id": "abc"})), fixed_now());
        assert_eq!(hotel.id, "abc");

        let hotel = normalize_hotel(raw(json!({"hotelId": null, "id": 12})), fixed_now());
        assert_eq!(hotel.id, "12");
    }

    #[test]
    fn test_timestamps() {
        let now = fixed_now();
        let hotel = normalize_hotel(raw(json!({"hotelId": 1})), now);
        assert_eq!(hotel.created_at, now);
        assert_eq!(hotel.updated_at, None);

        let hotel = normalize_hotel(
            raw(json!({
                "hotelId": 1,
                "createdAt": "2024-01-15T10:30:00",
                "updatedAt": "2024-02-01T08:00:00Z"
            })),
            now,
        );
        assert_eq!(
            hotel.created_at,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );
        assert_eq!(
            hotel.updated_at,
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert!(parse_timestamp(&json!("2024-01-15")).is_some());
        assert!(parse_timestamp(&json!("2024-01-15 10:30:00.123")).is_some());
        assert_eq!(
            parse_timestamp(&json!(0)),
            Some(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap())
        );
        assert!(parse_timestamp(&json!("yesterday")).is_none());
        assert!(parse_timestamp(&json!("")).is_none());
        assert!(parse_timestamp(&json!(true)).is_none());
    }

    #[test]
    fn test_display_images_uploads_first() {
        let hotel = normalize_hotel(
            raw(json!({
                "hotelId": 2,
                "hotelImageUploadBase64": ["QUJD"],
                "hotelImageUrls": ["https://cdn.example.com/a.jpg"]
            })),
            fixed_now(),
        );
        assert_eq!(
            hotel.display_images(),
            vec![
                "data:image/jpeg;base64,QUJD".to_string(),
                "https://cdn.example.com/a.jpg".to_string()
            ]
        );
    }

    #[test]
    fn test_filter_matches_name_or_address() {
        let hotels = vec![
            hotel("Grand Plaza", "123 Main St, NYC"),
            hotel("Ocean View", "456 Beach Ave, Miami"),
            hotel("Mountain Lodge", "789 Peak Rd, Denver"),
        ];

        let names: Vec<&str> = filter_hotels(&hotels, "  MIAMI ")
            .map(|h| h.hotel_name.as_str())
            .collect();
        assert_eq!(names, vec!["Ocean View"]);

        let names: Vec<&str> = filter_hotels(&hotels, "o")
            .map(|h| h.hotel_name.as_str())
            .collect();
        assert_eq!(names, vec!["Ocean View", "Mountain Lodge"]);
    }

    #[test]
    fn test_filter_view_is_restartable() {
        let hotels = vec![hotel("A", "x"), hotel("B", "y")];
        let view = filter_hotels(&hotels, "");
        assert_eq!(view.clone().count(), 2);
        assert_eq!(view.count(), 2);
    }

    #[test]
    fn test_filter_by_district() {
        let mut colombo = hotel("A", "x");
        colombo.district = Some("Colombo".to_string());
        let mut kandy = hotel("B", "y");
        kandy.district = Some("Kandy".to_string());
        let hotels = vec![colombo, kandy, hotel("C", "z")];

        let filtered = filter_by_district(hotels.clone(), "colombo");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].hotel_name, "A");
        assert_eq!(filter_by_district(hotels, ALL_DISTRICTS).len(), 3);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(None), NOT_UPDATED);
        let ts = Utc.with_ymd_and_hms(2024, 1, 5, 14, 3, 9).unwrap();
        assert_eq!(format_timestamp(Some(ts)), "Jan 5, 2024, 02:03:09 PM");
    }

    #[test]
    fn test_apply_local_edit() {
        let mut hotels = vec![hotel("Old", "addr")];
        let now = fixed_now();
        let edit = HotelEdit {
            hotel_name: Some("New".to_string()),
            amenities: Some(vec!["spa".to_string()]),
            ..HotelEdit::default()
        };

        assert!(apply_local_edit(&mut hotels, "1", edit.clone(), now));
        assert_eq!(hotels[0].hotel_name, "New");
        assert_eq!(hotels[0].hotel_address, "addr");
        assert_eq!(hotels[0].amenities, vec!["spa"]);
        assert_eq!(hotels[0].updated_at, Some(now));

        assert!(!apply_local_edit(&mut hotels, "missing", edit, now));
    }

    fn arb_hotel() -> impl Strategy<Value = Hotel> {
        ("[a-zA-Z ]{0,12}", "[a-zA-Z0-9 ,]{0,16}").prop_map(|(name, address)| hotel(&name, &address))
    }

    proptest! {
        #[test]
        fn test_empty_term_is_identity(hotels in prop::collection::vec(arb_hotel(), 0..20)) {
            let filtered: Vec<Hotel> = filter_hotels(&hotels, "").cloned().collect();
            prop_assert_eq!(filtered, hotels);
        }

        #[test]
        fn test_filter_is_sound_and_complete(
            hotels in prop::collection::vec(arb_hotel(), 0..20),
            term in "[a-zA-Z]{1,3}",
        ) {
            let needle = term.to_lowercase();
            let predicate = |h: &Hotel| {
                h.hotel_name.to_lowercase().contains(&needle)
                    || h.hotel_address.to_lowercase().contains(&needle)
            };

            let filtered: Vec<&Hotel> = filter_hotels(&hotels, &term).collect();
            for h in &filtered {
                prop_assert!(predicate(h));
            }
            let expected: Vec<&Hotel> = hotels.iter().filter(|h| predicate(h)).collect();
            prop_assert_eq!(filtered, expected);
        }

        #[test]
        fn test_amenity_normalization_is_idempotent(names in prop::collection::vec("[a-z]{1,8}", 0..8)) {
            let first = normalize_hotel(
                raw(json!({"hotelId": 1, "amenities": names.clone()})),
                fixed_now(),
            );
            let second = normalize_hotel(
                raw(json!({"hotelId": 1, "amenities": first.amenities.clone()})),
                fixed_now(),
            );
            prop_assert_eq!(&first.amenities, &names);
            prop_assert_eq!(second.amenities, first.amenities);
        }
    }
}

//! Plain-text rendering of view state for the terminal

use crate::shell::{ActiveView, Section};
use crate::views::{AdminDetails, OverviewStats, UserEntry, ViewState};
use std::fmt::Write as _;
use superadmin_core::hotel::format_timestamp;
use superadmin_core::{CarouselImage, Hotel, HotelAdmin};

const NOT_AVAILABLE: &str = "-";

/// Section heading with an underline
pub fn heading(section: Section) -> String {
    let title = section.title();
    format!("{title}\n{}\n", "=".repeat(title.chars().count()))
}

/// Everything the mounted view currently shows, under its heading
pub fn active_view(view: &ActiveView) -> String {
    match view {
        ActiveView::Overview(view) => heading(Section::Overview) + &overview(&view.stats()),
        ActiveView::Pending(view) => {
            let state = view.snapshot();
            heading(Section::PendingApprovals) + &admins(&state.data) + &state_messages(&state)
        }
        ActiveView::Approved(view) => {
            let state = view.snapshot();
            let mut out = heading(Section::ApprovedAdmins);
            match view.details() {
                Some(details) => out.push_str(&admin_details(&details)),
                None => out.push_str(&admins(&state.data)),
            }
            out + &state_messages(&state)
        }
        ActiveView::Users(view) => {
            let state = view.snapshot();
            heading(Section::AllUsers) + &users(&state.data) + &state_messages(&state)
        }
        ActiveView::Hotels(view) => {
            let state = view.snapshot();
            heading(Section::HotelManagement)
                + &hotels(&view.visible(), &view.summary())
                + &state_messages(&state)
        }
        ActiveView::Carousel(view) => {
            let state = view.snapshot();
            heading(Section::Carousel)
                + &carousel(&state.data, view.active_count())
                + &state_messages(&state)
        }
    }
}

fn state_messages<T>(state: &ViewState<T>) -> String {
    messages(state.error.as_deref(), state.notice.as_deref())
}

/// Overview figures; failed figures show as `-` with their errors below
pub fn overview(stats: &OverviewStats) -> String {
    let rows = [
        ("Total hotels", stats.total_hotels.map(|n| n.to_string())),
        ("Pending approvals", stats.pending_admins.map(|n| n.to_string())),
        ("Approved admins", stats.approved_admins.map(|n| n.to_string())),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<20} {}", value.as_deref().unwrap_or(NOT_AVAILABLE));
    }
    for error in &stats.errors {
        let _ = writeln!(out, "! {error}");
    }
    out
}

/// Admin table
pub fn admins(admins: &[HotelAdmin]) -> String {
    if admins.is_empty() {
        return "No admins found.\n".to_string();
    }

    let mut out = format!("{:>6}  {:<24} {:<32} {}\n", "ID", "NAME", "EMAIL", "PHONE");
    for admin in admins {
        let _ = writeln!(
            out,
            "{:>6}  {:<24} {:<32} {}",
            admin.admin_id,
            truncate(&admin.admin_name, 24),
            truncate(&admin.admin_email, 32),
            admin.admin_phone_number
        );
    }
    out
}

/// Registration table with a status column
pub fn users(entries: &[UserEntry]) -> String {
    if entries.is_empty() {
        return "No users found.\n".to_string();
    }

    let mut out = format!(
        "{:>6}  {:<24} {:<32} {:<9} {}\n",
        "ID", "NAME", "EMAIL", "STATUS", "PHONE"
    );
    for entry in entries {
        let admin = &entry.admin;
        let _ = writeln!(
            out,
            "{:>6}  {:<24} {:<32} {:<9} {}",
            admin.admin_id,
            truncate(&admin.admin_name, 24),
            truncate(&admin.admin_email, 32),
            entry.status,
            admin.admin_phone_number
        );
    }
    out
}

/// Every field of one registration
pub fn user_details(entry: &UserEntry) -> String {
    let admin = &entry.admin;
    let or_missing = |text: &str| {
        if text.trim().is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            text.to_string()
        }
    };

    let mut out = String::new();
    let _ = writeln!(out, "User:    {} (#{})", or_missing(&admin.admin_name), admin.admin_id);
    let _ = writeln!(out, "Email:   {}", or_missing(&admin.admin_email));
    let _ = writeln!(out, "Phone:   {}", or_missing(&admin.admin_phone_number));
    let _ = writeln!(out, "Status:  {}", entry.status);
    out
}

/// Hotel table followed by `summary`
pub fn hotels(hotels: &[Hotel], summary: &str) -> String {
    let mut out = String::new();
    if hotels.is_empty() {
        out.push_str("No hotels found.\n");
    } else {
        let _ = writeln!(
            out,
            "{:>6}  {:<28} {:<14} {:<30} {:>6} {:>10}  {}",
            "ID", "NAME", "DISTRICT", "ADDRESS", "RATING", "PRICE", "UPDATED"
        );
        for hotel in hotels {
            let _ = writeln!(
                out,
                "{:>6}  {:<28} {:<14} {:<30} {:>6} {:>10}  {}",
                truncate(&hotel.id, 6),
                truncate(&hotel.hotel_name, 28),
                truncate(hotel.district.as_deref().unwrap_or(NOT_AVAILABLE), 14),
                truncate(&hotel.hotel_address, 30),
                hotel
                    .hotel_rating
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |r| format!("{r:.1}")),
                hotel
                    .hotel_basic_price_per_night
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |p| format!("{p:.2}")),
                format_timestamp(hotel.updated_at)
            );
        }
    }
    if !summary.is_empty() {
        let _ = writeln!(out, "{summary}");
    }
    out
}

/// One admin and the hotels they registered
pub fn admin_details(details: &AdminDetails) -> String {
    let admin = &details.admin;
    let mut out = String::new();
    let _ = writeln!(out, "Admin:  {} (#{})", admin.admin_name, admin.admin_id);
    let _ = writeln!(out, "Email:  {}", admin.admin_email);
    let _ = writeln!(out, "Phone:  {}", admin.admin_phone_number);
    out.push('\n');

    if let Some(error) = &details.hotels.error {
        let _ = writeln!(out, "! {error}");
        return out;
    }
    for hotel in &details.hotels.data {
        let _ = writeln!(out, "- {} ({})", hotel.hotel_name, hotel.hotel_address);
        let _ = writeln!(out, "  created {}", format_timestamp(Some(hotel.created_at)));
        let _ = writeln!(out, "  updated {}", format_timestamp(hotel.updated_at));
        if !hotel.amenities.is_empty() {
            let _ = writeln!(out, "  amenities: {}", hotel.amenity_summary());
        }
        let images = hotel.display_images().len();
        if images > 0 {
            let _ = writeln!(out, "  images: {images}");
        }
    }
    if details.hotels.data.is_empty() {
        out.push_str("No hotels registered by this admin.\n");
    }
    out
}

/// Carousel table with the active count
pub fn carousel(images: &[CarouselImage], active: usize) -> String {
    if images.is_empty() {
        return "No carousel images.\n".to_string();
    }

    let mut out = format!("{:>6}  {:<8}  {}\n", "ID", "STATE", "IMAGE");
    for image in images {
        let _ = writeln!(
            out,
            "{:>6}  {:<8}  {}",
            image.carousel_image_id,
            image.state,
            truncate(&image.data_uri(), 48)
        );
    }
    let _ = writeln!(out, "{active} of {} images active", images.len());
    out
}

/// District names, one per line
pub fn districts(districts: &[String]) -> String {
    districts.iter().fold(String::new(), |mut out, name| {
        let _ = writeln!(out, "{name}");
        out
    })
}

/// Error and notice lines for a view
pub fn messages(error: Option<&str>, notice: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(notice) = notice {
        let _ = writeln!(out, "{notice}");
    }
    if let Some(error) = error {
        let _ = writeln!(out, "! {error}");
    }
    out
}

/// Cut `text` to `width` characters, marking the cut with `…`
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::fixtures::{admin, hotel, image};
    use crate::mock::MockApi;
    use crate::views::PendingApprovals;
    use std::sync::Arc;
    use pretty_assertions::assert_eq;
    use superadmin_core::CarouselState;
    use superadmin_core::types::AdminStatus;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Grand Plaza Hotel", 8), "Grand P…");
    }

    #[test]
    fn test_heading() {
        assert_eq!(heading(Section::Carousel), "Carousel Management\n===================\n");
    }

    #[test]
    fn test_overview_marks_missing_figures() {
        let stats = OverviewStats {
            total_hotels: Some(42),
            pending_admins: None,
            approved_admins: Some(3),
            errors: vec!["Network error. Please try again.".to_string()],
        };
        let text = overview(&stats);
        assert!(text.contains("Total hotels         42"));
        assert!(text.contains("Pending approvals    -"));
        assert!(text.ends_with("! Network error. Please try again.\n"));
    }

    #[test]
    fn test_admin_table() {
        let text = admins(&[admin(1), admin(12)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("     1  Admin 1"));
        assert_eq!(admins(&[]), "No admins found.\n");
    }

    #[test]
    fn test_user_table_and_details() {
        let entries = [
            UserEntry {
                admin: admin(1),
                status: AdminStatus::Pending,
            },
            UserEntry {
                admin: HotelAdmin {
                    admin_name: String::new(),
                    ..admin(2)
                },
                status: AdminStatus::Approved,
            },
        ];
        let text = users(&entries);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("STATUS"));
        assert!(lines[1].contains("pending"));
        assert!(lines[2].contains("approved"));
        assert_eq!(users(&[]), "No users found.\n");

        let text = user_details(&entries[1]);
        assert!(text.contains("User:    - (#2)"));
        assert!(text.contains("Email:   admin2@"));
        assert!(text.ends_with("Status:  approved\n"));
    }

    #[test]
    fn test_hotel_table_shows_never_updated() {
        let text = hotels(&[hotel("1", "Grand Plaza", "Main St", "Colombo")], "Showing 1 of 1 hotels");
        assert!(text.contains("Not updated yet"));
        assert!(text.ends_with("Showing 1 of 1 hotels\n"));
    }

    #[test]
    fn test_carousel_table() {
        let text = carousel(
            &[image(1, CarouselState::Active), image(2, CarouselState::Inactive)],
            1,
        );
        assert!(text.contains("data:image/jpeg;base64,AAAA"));
        assert!(text.ends_with("1 of 2 images active\n"));
    }

    #[test]
    fn test_admin_details() {
        let details = AdminDetails {
            admin: admin(3),
            hotels: ViewState {
                data: vec![hotel("9", "Sea View", "Beach Rd", "Galle")],
                ..ViewState::default()
            },
        };
        let text = admin_details(&details);
        assert!(text.contains("Admin:  Admin 3 (#3)"));
        assert!(text.contains("- Sea View (Beach Rd)"));
        assert!(text.contains("created Jan 15, 2024, 10:30:00 AM"));
    }

    #[tokio::test]
    async fn test_active_view_includes_messages() {
        let mock = MockApi::new().with_pending(vec![admin(1), admin(2)]);
        let view = PendingApprovals::new(Arc::new(mock));
        view.load().await.unwrap();
        view.approve(1).await.unwrap();

        let text = active_view(&ActiveView::Pending(view));
        assert!(text.starts_with("Pending Approvals\n"));
        assert!(text.contains("Admin 2"));
        assert!(!text.contains("admin1@"));
        assert!(text.ends_with("Admin approved\n"));
    }

    #[test]
    fn test_messages() {
        assert_eq!(messages(Some("boom"), Some("done")), "done\n! boom\n");
        assert_eq!(messages(None, None), "");
    }
}

//! Dashboard workflows end to end through the HTTP gateway

mod common;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use superadmin_console::gateway::endpoints;
use superadmin_console::views::{CarouselManager, HotelFilters, HotelManagement, PendingApprovals};
use superadmin_console::{Section, Shell, render};
use superadmin_core::hotel::ALL_DISTRICTS;
use superadmin_core::types::AdminStatus;
use superadmin_core::{CarouselState, Error, Session};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_get(server: &MockServer, endpoint: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_approval_removes_admin_after_server_success() {
    init_test_logging();
    let server = MockServer::start().await;
    mount_get(
        &server,
        endpoints::PENDING_ADMINS,
        json!([admin_json(1), admin_json(2), admin_json(3)]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(endpoints::APPROVE_ADMIN))
        .and(query_param("adminId", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Admin approved"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(endpoints::REJECT_ADMIN))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server, session_with_token(&token_for("root@hotels.lk")));
    let view = PendingApprovals::new(Arc::new(api));
    view.load().await.unwrap();
    assert_eq!(view.admin_ids(), vec![1, 2, 3]);

    view.approve(2).await.unwrap();
    assert_eq!(view.admin_ids(), vec![1, 3]);

    assert!(view.reject(3).await.is_err());
    assert_eq!(view.admin_ids(), vec![1, 3]);
    assert_eq!(
        view.snapshot().error.as_deref(),
        Some("Failed to reject admin: 500")
    );
}

#[tokio::test]
async fn test_hotel_filters_pick_endpoints() {
    init_test_logging();
    let server = MockServer::start().await;
    mount_get(&server, endpoints::DISTRICTS, json!(["Colombo", "Galle"])).await;
    mount_get(
        &server,
        endpoints::ALL_HOTELS,
        json!([
            hotel_json(1, "Grand Plaza", "Colombo"),
            hotel_json(2, "Sea View", "Galle"),
            hotel_json(3, "Plaza Lodge", "Galle")
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(endpoints::HOTELS_BY_DISTRICT))
        .and(query_param("districtName", "Galle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            hotel_json(2, "Sea View", "Galle"),
            hotel_json(3, "Plaza Lodge", "Galle")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server, session_with_token(&token_for("root@hotels.lk")));
    let view = HotelManagement::new(Arc::new(api));
    view.load().await.unwrap();

    assert_eq!(view.districts(), vec![ALL_DISTRICTS, "Colombo", "Galle"]);
    assert_eq!(view.summary(), "Showing 3 of 3 hotels");

    view.set_search_term("plaza");
    assert_eq!(view.summary(), "Showing 2 of 3 hotels");

    view.set_district("Galle").await.unwrap();
    let names: Vec<String> = view.visible().into_iter().map(|h| h.hotel_name).collect();
    assert_eq!(names, vec!["Plaza Lodge"]);
}

#[tokio::test]
async fn test_added_by_me_uses_token_identity() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(endpoints::HOTELS_ADDED_BY_ME))
        .and(query_param("adminEmail", "owner@hotels.lk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            hotel_json(4, "Hill Top", "Kandy"),
            hotel_json(5, "Lake Side", "Colombo")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server, session_with_token(&token_for("owner@hotels.lk")));
    let view = HotelManagement::new(Arc::new(api));
    view.apply_filters(HotelFilters {
        search_term: String::new(),
        district: "kandy".to_string(),
        added_by_me: true,
    })
    .await
    .unwrap();

    let ids: Vec<String> = view.visible().into_iter().map(|h| h.id).collect();
    assert_eq!(ids, vec!["4"]);
}

#[tokio::test]
async fn test_added_by_me_without_identity_fails_closed() {
    init_test_logging();
    let server = MockServer::start().await;
    let token = token_with_claims(&json!({ "role": "SUPER_ADMIN" }));

    let api = client_for(&server, session_with_token(&token));
    let view = HotelManagement::new(Arc::new(api));
    let result = view.set_added_by_me(true).await;

    assert!(matches!(result, Err(Error::IdentityUnavailable)));
    assert!(!view.filters().added_by_me);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_carousel_toggle_refetches() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(endpoints::CAROUSEL_IMAGES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([image_json(5, "Active")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_get(&server, endpoints::CAROUSEL_IMAGES, json!([image_json(5, "INACTIVE")])).await;
    Mock::given(method("PUT"))
        .and(path(endpoints::CHANGE_CAROUSEL_STATE))
        .and(query_param("carouselImageId", "5"))
        .and(query_param("newState", "Inactive"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = client_for(&server, session_with_token(&token_for("root@hotels.lk")));
    let view = CarouselManager::new(Arc::new(api));
    view.load().await.unwrap();
    assert_eq!(view.active_count(), 1);

    assert_eq!(view.toggle_listed(5).await.unwrap(), CarouselState::Inactive);
    assert_eq!(view.state_of(5), Some(CarouselState::Inactive));
    assert_eq!(view.active_count(), 0);
    assert_eq!(
        view.snapshot().notice.as_deref(),
        Some("Image 5 is now Inactive")
    );
}

#[tokio::test]
async fn test_overview_shows_zero_for_unrecognised_count() {
    init_test_logging();
    let server = MockServer::start().await;
    mount_get(&server, endpoints::TOTAL_HOTEL_COUNT, json!({})).await;
    mount_get(&server, endpoints::PENDING_ADMINS, json!([admin_json(1)])).await;
    Mock::given(method("GET"))
        .and(path(endpoints::APPROVED_ADMINS))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let api = client_for(&server, session_with_token(&token_for("root@hotels.lk")));
    let mut shell = Shell::new(Arc::new(api));
    shell.navigate(Section::Overview).await.unwrap();

    let stats = shell.overview().unwrap().stats();
    assert_eq!(stats.total_hotels, Some(0));
    assert_eq!(stats.pending_admins, Some(1));
    assert_eq!(stats.approved_admins, None);
    assert_eq!(stats.errors, vec!["Failed to fetch approved admins: 503"]);

    let text = render::active_view(shell.view().unwrap());
    assert!(text.starts_with("Dashboard Overview\n"));
}

#[tokio::test]
async fn test_expired_session_logs_shell_out() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(endpoints::APPROVED_ADMINS))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = session_with_token(&token_for("root@hotels.lk"));
    let api = client_for(&server, Arc::clone(&session));
    let mut shell = Shell::new(Arc::new(api));
    assert!(shell.is_authenticated());

    let result = shell.navigate(Section::ApprovedAdmins).await;
    assert!(matches!(result, Err(Error::Unauthorized { status: 401 })));
    assert!(!shell.is_authenticated());
    assert!(shell.view().is_none());
    assert!(!session.is_authenticated());

    let again = shell.navigate(Section::Carousel).await;
    assert!(matches!(again, Err(Error::Unauthorized { .. })));
}

#[tokio::test]
async fn test_all_users_lists_both_registrations() {
    init_test_logging();
    let server = MockServer::start().await;
    mount_get(&server, endpoints::PENDING_ADMINS, json!([admin_json(1)])).await;
    mount_get(
        &server,
        endpoints::APPROVED_ADMINS,
        json!([admin_json(2), admin_json(3)]),
    )
    .await;

    let api = client_for(&server, session_with_token(&token_for("root@hotels.lk")));
    let mut shell = Shell::new(Arc::new(api));
    shell.navigate(Section::AllUsers).await.unwrap();

    let users = shell.users().unwrap();
    assert_eq!(users.entries(None).len(), 3);
    assert_eq!(users.count(AdminStatus::Approved), 2);
    assert_eq!(users.details(1).unwrap().status, AdminStatus::Pending);
    assert!(matches!(users.details(42), Err(Error::InvalidId { .. })));

    let text = shell.view().map(render::active_view).unwrap_or_default();
    assert!(text.starts_with("All Registered Users\n"));
    assert!(text.contains("admin3@hotels.lk"));
}

#[tokio::test]
async fn test_teardown_cancels_slow_fetch() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(endpoints::PENDING_ADMINS))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([admin_json(1)]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let api = Arc::new(client_for(&server, session_with_token(&token_for("root@hotels.lk"))));
    let view = Arc::new(PendingApprovals::new(api));

    let loading = {
        let view = Arc::clone(&view);
        tokio::spawn(async move { view.load().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    view.teardown();

    let result = loading.await.unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(view.admin_ids().is_empty());
}

#[tokio::test]
async fn test_login_stores_token_for_the_gateway() {
    init_test_logging();
    let server = MockServer::start().await;
    mount_get(&server, endpoints::CAROUSEL_IMAGES, json!([])).await;

    let session = Arc::new(Session::in_memory());
    let api = client_for(&server, Arc::clone(&session));
    let mut shell = Shell::new(Arc::new(api));
    assert!(matches!(
        shell.navigate(Section::Carousel).await,
        Err(Error::Unauthorized { .. })
    ));

    let token = token_for("root@hotels.lk");
    shell.login(&format!("Bearer {token}")).unwrap();
    shell.navigate(Section::Carousel).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let authorization = requests[0].headers.get("authorization").unwrap().to_str().unwrap();
    assert_eq!(authorization, format!("Bearer {token}"));
}

//! HTTP gateway for the hotel super-admin API
//!
//! One method per remote operation. Every request carries the bearer token
//! when one is stored, every response is mapped onto the error taxonomy, and
//! every body is decoded to a typed value before it leaves this module.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, header, multipart};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use superadmin_core::config::ApiConfig;
use superadmin_core::decode::{self, ActionOutcome};
use superadmin_core::hotel::normalize_hotels;
use superadmin_core::types::{AdminId, CarouselImageId, RawHotel};
use superadmin_core::{CarouselImage, CarouselState, Error, Hotel, HotelAdmin, Result, Session};
use tracing::{debug, error, warn};

/// Endpoint paths relative to the API base URL
pub mod endpoints {
    /// Pending admin registrations
    pub const PENDING_ADMINS: &str = "/hotel/super-admin/pending-request";
    /// Approve a pending admin
    pub const APPROVE_ADMIN: &str = "/hotel/super-admin/approve-admin";
    /// Reject a pending admin
    pub const REJECT_ADMIN: &str = "/hotel/super-admin/reject-admin";
    /// Approved admins
    pub const APPROVED_ADMINS: &str = "/hotel/super-admin/approved-admins";
    /// Hotels registered by one admin
    pub const HOTELS_BY_ADMIN: &str = "/hotel/super-admin/added-hotel-by-admin";
    /// Every hotel
    pub const ALL_HOTELS: &str = "/hotel/fetch-all-hotels";
    /// Hotels in one district
    pub const HOTELS_BY_DISTRICT: &str = "/hotel/fetch-hotels-by-district";
    /// Hotels registered by the caller
    pub const HOTELS_ADDED_BY_ME: &str = "/hotel/added-hotel-by-admin-email";
    /// District names
    pub const DISTRICTS: &str = "/hotel/districts";
    /// Total hotel count
    pub const TOTAL_HOTEL_COUNT: &str = "/hotel/total-hotel-count";
    /// Carousel images
    pub const CAROUSEL_IMAGES: &str = "/hotel/super-admin/get-all-carousel-images";
    /// Upload a carousel image
    pub const ADD_CAROUSEL_IMAGE: &str = "/hotel/super-admin/add-carousel-image";
    /// Change a carousel image's state
    pub const CHANGE_CAROUSEL_STATE: &str = "/hotel/super-admin/change-carousel-image-state";
    /// Delete a carousel image
    pub const DELETE_CAROUSEL_IMAGE: &str = "/hotel/super-admin/delete-carousel-image";
}

/// File extensions accepted for carousel uploads
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Multipart field the upload endpoint reads the file from
pub const UPLOAD_FIELD: &str = "image";

/// An image file ready to be sent to the carousel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name reported to the server
    pub file_name: String,
    /// MIME type derived from the extension
    pub mime_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload from in-memory bytes, validating the file name
    ///
    /// # Errors
    ///
    /// Returns a validation error if the extension is not an accepted image
    /// type or the content is empty.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let extension = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::validation(
                "file",
                format!("'{file_name}' is not an image ({})", IMAGE_EXTENSIONS.join(", ")),
            ));
        }
        if bytes.is_empty() {
            return Err(Error::validation("file", format!("'{file_name}' is empty")));
        }

        let mime_type = match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            _ => "image/gif",
        }
        .to_string();

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// Read and validate an image file from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not an accepted image.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::validation("file", format!("invalid path {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Self::new(file_name, bytes)
    }
}

/// The remote operations the dashboard views depend on
#[async_trait]
pub trait SuperAdminApi: Send + Sync {
    /// The session whose token authorizes requests
    fn session(&self) -> &Session;

    /// List admins awaiting a decision
    async fn pending_admins(&self) -> Result<Vec<HotelAdmin>>;

    /// Approve a pending admin
    async fn approve_admin(&self, admin_id: AdminId) -> Result<ActionOutcome>;

    /// Reject a pending admin
    async fn reject_admin(&self, admin_id: AdminId) -> Result<ActionOutcome>;

    /// List approved admins
    async fn approved_admins(&self) -> Result<Vec<HotelAdmin>>;

    /// Hotels registered by one admin
    async fn hotels_by_admin(&self, admin_id: AdminId) -> Result<Vec<Hotel>>;

    /// Every hotel
    async fn all_hotels(&self) -> Result<Vec<Hotel>>;

    /// Hotels in one district
    async fn hotels_by_district(&self, district: &str) -> Result<Vec<Hotel>>;

    /// Hotels registered by the admin identified by `admin_identity`
    async fn hotels_added_by(&self, admin_identity: &str) -> Result<Vec<Hotel>>;

    /// District names
    async fn districts(&self) -> Result<Vec<String>>;

    /// Total number of hotels
    async fn total_hotel_count(&self) -> Result<u64>;

    /// Every carousel image
    async fn carousel_images(&self) -> Result<Vec<CarouselImage>>;

    /// Upload a new carousel image
    async fn add_carousel_image(&self, upload: ImageUpload) -> Result<ActionOutcome>;

    /// Set a carousel image's state
    async fn change_carousel_image_state(
        &self,
        image_id: CarouselImageId,
        new_state: CarouselState,
    ) -> Result<ActionOutcome>;

    /// Delete a carousel image
    async fn delete_carousel_image(&self, image_id: CarouselImageId) -> Result<ActionOutcome>;
}

/// `reqwest` implementation of [`SuperAdminApi`]
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a client for the configured API
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, session: Arc<Session>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("superadmin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// The base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The shared session handle
    pub fn session_handle(&self) -> Arc<Session> {
        Arc::clone(&self.session)
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut url = format!("{}{path}", self.base_url);
        if !query.is_empty() {
            let params: Vec<String> = query
                .iter()
                .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
                .collect();
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.session.auth_token();
        if token.is_empty() {
            request
        } else {
            request.bearer_auth(token)
        }
    }

    /// Send a request and map the status onto the error taxonomy
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response> {
        let request = self.authorize(request);
        debug!(
            endpoint,
            token_present = self.session.is_authenticated(),
            "Sending request"
        );

        let response = request.send().await.map_err(|e| {
            error!(endpoint, "Request failed: {e}");
            Error::network(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(endpoint, status = status.as_u16(), "Credentials rejected, ending session");
            if let Err(e) = self.session.invalidate() {
                warn!("Failed to clear session: {e}");
            }
            return Err(Error::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(endpoint, status = status.as_u16(), "Request returned an error status");
            return Err(Error::http(status.as_u16(), body));
        }

        debug!(endpoint, status = status.as_u16(), "Request succeeded");
        Ok(response)
    }

    /// GET a JSON body; an empty body reads as `null`
    async fn get_json(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value> {
        let request = self.client.get(self.url(endpoint, query));
        let response = self.send(endpoint, request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| Error::network(format!("failed to read body: {e}")))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| Error::unexpected_shape(endpoint, e.to_string()))
    }

    async fn get_hotels(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Vec<Hotel>> {
        let body = self.get_json(endpoint, query).await?;
        let raw: Vec<RawHotel> = decode::decode_list(endpoint, &body)?;
        Ok(normalize_hotels(raw))
    }

    /// Send a mutation and interpret whatever success body comes back
    async fn action(&self, endpoint: &str, request: RequestBuilder) -> Result<ActionOutcome> {
        let response = self.send(endpoint, request).await?;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let text = response
            .text()
            .await
            .map_err(|e| Error::network(format!("failed to read body: {e}")))?;

        Ok(ActionOutcome::from_body(content_type.as_deref(), &text))
    }
}

#[async_trait]
impl SuperAdminApi for ApiClient {
    fn session(&self) -> &Session {
        &self.session
    }

    async fn pending_admins(&self) -> Result<Vec<HotelAdmin>> {
        let body = self.get_json(endpoints::PENDING_ADMINS, &[]).await?;
        decode::decode_list(endpoints::PENDING_ADMINS, &body)
    }

    async fn approve_admin(&self, admin_id: AdminId) -> Result<ActionOutcome> {
        let id = admin_id.to_string();
        let request = self
            .client
            .post(self.url(endpoints::APPROVE_ADMIN, &[("adminId", &id)]));
        self.action(endpoints::APPROVE_ADMIN, request).await
    }

    async fn reject_admin(&self, admin_id: AdminId) -> Result<ActionOutcome> {
        let id = admin_id.to_string();
        let request = self
            .client
            .post(self.url(endpoints::REJECT_ADMIN, &[("adminId", &id)]));
        self.action(endpoints::REJECT_ADMIN, request).await
    }

    async fn approved_admins(&self) -> Result<Vec<HotelAdmin>> {
        let body = self.get_json(endpoints::APPROVED_ADMINS, &[]).await?;
        decode::decode_list(endpoints::APPROVED_ADMINS, &body)
    }

    async fn hotels_by_admin(&self, admin_id: AdminId) -> Result<Vec<Hotel>> {
        let id = admin_id.to_string();
        self.get_hotels(endpoints::HOTELS_BY_ADMIN, &[("adminId", &id)])
            .await
    }

    async fn all_hotels(&self) -> Result<Vec<Hotel>> {
        self.get_hotels(endpoints::ALL_HOTELS, &[]).await
    }

    async fn hotels_by_district(&self, district: &str) -> Result<Vec<Hotel>> {
        self.get_hotels(endpoints::HOTELS_BY_DISTRICT, &[("districtName", district)])
            .await
    }

    async fn hotels_added_by(&self, admin_identity: &str) -> Result<Vec<Hotel>> {
        self.get_hotels(endpoints::HOTELS_ADDED_BY_ME, &[("adminEmail", admin_identity)])
            .await
    }

    async fn districts(&self) -> Result<Vec<String>> {
        let body = self.get_json(endpoints::DISTRICTS, &[]).await?;
        decode::decode_districts(endpoints::DISTRICTS, &body)
    }

    async fn total_hotel_count(&self) -> Result<u64> {
        let body = self.get_json(endpoints::TOTAL_HOTEL_COUNT, &[]).await?;
        decode::decode_count(endpoints::TOTAL_HOTEL_COUNT, &body)
    }

    async fn carousel_images(&self) -> Result<Vec<CarouselImage>> {
        let body = self.get_json(endpoints::CAROUSEL_IMAGES, &[]).await?;
        decode::decode_list(endpoints::CAROUSEL_IMAGES, &body)
    }

    async fn add_carousel_image(&self, upload: ImageUpload) -> Result<ActionOutcome> {
        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime_type)
            .map_err(|e| Error::validation("file", e.to_string()))?;
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        let request = self
            .client
            .post(self.url(endpoints::ADD_CAROUSEL_IMAGE, &[]))
            .multipart(form);
        self.action(endpoints::ADD_CAROUSEL_IMAGE, request).await
    }

    async fn change_carousel_image_state(
        &self,
        image_id: CarouselImageId,
        new_state: CarouselState,
    ) -> Result<ActionOutcome> {
        let id = image_id.to_string();
        let request = self.client.put(self.url(
            endpoints::CHANGE_CAROUSEL_STATE,
            &[("carouselImageId", &id), ("newState", new_state.as_str())],
        ));
        self.action(endpoints::CHANGE_CAROUSEL_STATE, request).await
    }

    async fn delete_carousel_image(&self, image_id: CarouselImageId) -> Result<ActionOutcome> {
        let id = image_id.to_string();
        let request = self.client.delete(self.url(
            endpoints::DELETE_CAROUSEL_IMAGE,
            &[("carouselImageId", &id)],
        ));
        self.action(endpoints::DELETE_CAROUSEL_IMAGE, request).await
    }
}

//! In-memory API for testing views without a server

use crate::gateway::{ImageUpload, SuperAdminApi};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use superadmin_core::decode::ActionOutcome;
use superadmin_core::hotel::ALL_DISTRICTS;
use superadmin_core::types::{AdminId, CarouselImageId};
use superadmin_core::{CarouselImage, CarouselState, Error, Hotel, HotelAdmin, Result, Session};

/// A canned failure for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Non-2xx status with a text body
    Http(u16, &'static str),
    /// Transport failure
    Network,
    /// A body no decoder accepts
    UnexpectedShape,
    /// 401; the session is invalidated like the real gateway does
    Unauthorized,
}

/// Mock hotel API backed by plain vectors
///
/// Mutations change the stored records the way the server would, so a
/// refetch after an action sees the new state. Every call is recorded as
/// `operation` or `operation:argument`.
#[derive(Debug)]
pub struct MockApi {
    session: Session,
    pending: Mutex<Vec<HotelAdmin>>,
    approved: Mutex<Vec<HotelAdmin>>,
    hotels: Mutex<Vec<Hotel>>,
    admin_hotels: Mutex<HashMap<AdminId, Vec<Hotel>>>,
    added_by: Mutex<HashMap<String, Vec<Hotel>>>,
    districts: Mutex<Vec<String>>,
    carousel: Mutex<Vec<CarouselImage>>,
    failures: Mutex<HashMap<&'static str, MockFailure>>,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<String>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    /// Create an empty mock over an in-memory session
    pub fn new() -> Self {
        Self::with_session(Session::in_memory())
    }

    /// Create an empty mock over `session`
    pub fn with_session(session: Session) -> Self {
        Self {
            session,
            pending: Mutex::new(Vec::new()),
            approved: Mutex::new(Vec::new()),
            hotels: Mutex::new(Vec::new()),
            admin_hotels: Mutex::new(HashMap::new()),
            added_by: Mutex::new(HashMap::new()),
            districts: Mutex::new(Vec::new()),
            carousel: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Seed pending admins
    #[must_use]
    pub fn with_pending(self, admins: Vec<HotelAdmin>) -> Self {
        *self.pending.lock() = admins;
        self
    }

    /// Seed approved admins
    #[must_use]
    pub fn with_approved(self, admins: Vec<HotelAdmin>) -> Self {
        *self.approved.lock() = admins;
        self
    }

    /// Seed the full hotel list
    #[must_use]
    pub fn with_hotels(self, hotels: Vec<Hotel>) -> Self {
        *self.hotels.lock() = hotels;
        self
    }

    /// Seed the hotels registered by one admin id
    #[must_use]
    pub fn with_admin_hotels(self, admin_id: AdminId, hotels: Vec<Hotel>) -> Self {
        self.admin_hotels.lock().insert(admin_id, hotels);
        self
    }

    /// Seed the hotels registered by one admin identity
    #[must_use]
    pub fn with_added_by(self, identity: impl Into<String>, hotels: Vec<Hotel>) -> Self {
        self.added_by.lock().insert(identity.into(), hotels);
        self
    }

    /// Seed the district names
    #[must_use]
    pub fn with_districts(self, districts: Vec<String>) -> Self {
        *self.districts.lock() = districts;
        self
    }

    /// Seed carousel images
    #[must_use]
    pub fn with_carousel(self, images: Vec<CarouselImage>) -> Self {
        *self.carousel.lock() = images;
        self
    }

    /// Make every call to `operation` fail
    #[must_use]
    pub fn with_failure(self, operation: &'static str, failure: MockFailure) -> Self {
        self.fail(operation, failure);
        self
    }

    /// Delay every call
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = Some(delay);
        self
    }

    /// Make every later call to `operation` fail
    pub fn fail(&self, operation: &'static str, failure: MockFailure) {
        self.failures.lock().insert(operation, failure);
    }

    /// Let `operation` succeed again
    pub fn recover(&self, operation: &'static str) {
        self.failures.lock().remove(operation);
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// How many calls were made to `operation`
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.split(':').next() == Some(operation))
            .count()
    }

    /// Current carousel images as the server holds them
    pub fn stored_carousel(&self) -> Vec<CarouselImage> {
        self.carousel.lock().clone()
    }

    async fn enter(&self, operation: &'static str, argument: Option<String>) -> Result<()> {
        let call = argument.map_or_else(|| operation.to_string(), |arg| format!("{operation}:{arg}"));
        self.calls.lock().push(call);

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failures.lock().get(operation).copied();
        match failure {
            None => Ok(()),
            Some(MockFailure::Http(status, body)) => Err(Error::http(status, body)),
            Some(MockFailure::Network) => Err(Error::network("connection refused")),
            Some(MockFailure::UnexpectedShape) => {
                Err(Error::unexpected_shape(operation, "mock shape failure"))
            }
            Some(MockFailure::Unauthorized) => {
                self.session.invalidate()?;
                Err(Error::Unauthorized { status: 401 })
            }
        }
    }
}

#[async_trait]
impl SuperAdminApi for MockApi {
    fn session(&self) -> &Session {
        &self.session
    }

    async fn pending_admins(&self) -> Result<Vec<HotelAdmin>> {
        self.enter("pending_admins", None).await?;
        Ok(self.pending.lock().clone())
    }

    async fn approve_admin(&self, admin_id: AdminId) -> Result<ActionOutcome> {
        self.enter("approve_admin", Some(admin_id.to_string())).await?;
        let mut pending = self.pending.lock();
        if let Some(index) = pending.iter().position(|a| a.admin_id == admin_id) {
            let admin = pending.remove(index);
            self.approved.lock().push(admin);
        }
        Ok(ActionOutcome::Text("Admin approved".to_string()))
    }

    async fn reject_admin(&self, admin_id: AdminId) -> Result<ActionOutcome> {
        self.enter("reject_admin", Some(admin_id.to_string())).await?;
        self.pending.lock().retain(|a| a.admin_id != admin_id);
        Ok(ActionOutcome::Empty)
    }

    async fn approved_admins(&self) -> Result<Vec<HotelAdmin>> {
        self.enter("approved_admins", None).await?;
        Ok(self.approved.lock().clone())
    }

    async fn hotels_by_admin(&self, admin_id: AdminId) -> Result<Vec<Hotel>> {
        self.enter("hotels_by_admin", Some(admin_id.to_string())).await?;
        Ok(self.admin_hotels.lock().get(&admin_id).cloned().unwrap_or_default())
    }

    async fn all_hotels(&self) -> Result<Vec<Hotel>> {
        self.enter("all_hotels", None).await?;
        Ok(self.hotels.lock().clone())
    }

    async fn hotels_by_district(&self, district: &str) -> Result<Vec<Hotel>> {
        self.enter("hotels_by_district", Some(district.to_string())).await?;
        let hotels = self.hotels.lock().clone();
        Ok(if district == ALL_DISTRICTS {
            hotels
        } else {
            hotels
                .into_iter()
                .filter(|h| h.district.as_deref() == Some(district))
                .collect()
        })
    }

    async fn hotels_added_by(&self, admin_identity: &str) -> Result<Vec<Hotel>> {
        self.enter("hotels_added_by", Some(admin_identity.to_string())).await?;
        Ok(self
            .added_by
            .lock()
            .get(admin_identity)
            .cloned()
            .unwrap_or_default())
    }

    async fn districts(&self) -> Result<Vec<String>> {
        self.enter("districts", None).await?;
        Ok(self.districts.lock().clone())
    }

    async fn total_hotel_count(&self) -> Result<u64> {
        self.enter("total_hotel_count", None).await?;
        Ok(self.hotels.lock().len() as u64)
    }

    async fn carousel_images(&self) -> Result<Vec<CarouselImage>> {
        self.enter("carousel_images", None).await?;
        Ok(self.carousel.lock().clone())
    }

    async fn add_carousel_image(&self, upload: ImageUpload) -> Result<ActionOutcome> {
        self.enter("add_carousel_image", Some(upload.file_name.clone())).await?;
        let mut carousel = self.carousel.lock();
        let next_id = carousel
            .iter()
            .map(|image| image.carousel_image_id)
            .max()
            .unwrap_or(0)
            + 1;
        carousel.push(CarouselImage {
            carousel_image_id: next_id,
            carousel_image_base64: format!("{}-bytes", upload.bytes.len()),
            state: CarouselState::Active,
        });
        Ok(ActionOutcome::Json(json!({"carouselImageId": next_id})))
    }

    async fn change_carousel_image_state(
        &self,
        image_id: CarouselImageId,
        new_state: CarouselState,
    ) -> Result<ActionOutcome> {
        self.enter(
            "change_carousel_image_state",
            Some(format!("{image_id}={new_state}")),
        )
        .await?;
        if let Some(image) = self
            .carousel
            .lock()
            .iter_mut()
            .find(|image| image.carousel_image_id == image_id)
        {
            image.state = new_state;
        }
        Ok(ActionOutcome::Empty)
    }

    async fn delete_carousel_image(&self, image_id: CarouselImageId) -> Result<ActionOutcome> {
        self.enter("delete_carousel_image", Some(image_id.to_string())).await?;
        self.carousel
            .lock()
            .retain(|image| image.carousel_image_id != image_id);
        Ok(ActionOutcome::Empty)
    }
}

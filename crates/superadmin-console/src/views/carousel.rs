//! Homepage carousel manager
//!
//! Every successful mutation is followed by a full refetch; the list on
//! display is always what the server last returned.

use super::{ViewState, degrade_shape};
use crate::gateway::{ImageUpload, SuperAdminApi};
use crate::scope::{InFlight, ViewScope};
use parking_lot::RwLock;
use std::sync::Arc;
use superadmin_core::types::CarouselImageId;
use superadmin_core::{CarouselImage, CarouselState, Error, Result};
use tracing::{error, info};

/// Claim key for uploads, which have no id until the server assigns one
const UPLOAD_CLAIM: i64 = 0;

/// The carousel image list and its actions
pub struct CarouselManager {
    api: Arc<dyn SuperAdminApi>,
    scope: ViewScope,
    state: RwLock<ViewState<Vec<CarouselImage>>>,
    in_flight: InFlight,
}

impl std::fmt::Debug for CarouselManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselManager")
            .field("images", &self.state.read().data.len())
            .finish_non_exhaustive()
    }
}

impl CarouselManager {
    /// Create the view; nothing is fetched until [`Self::load`]
    pub fn new(api: Arc<dyn SuperAdminApi>) -> Self {
        Self {
            api,
            scope: ViewScope::new(),
            state: RwLock::new(ViewState::default()),
            in_flight: InFlight::new(),
        }
    }

    /// Fetch every carousel image
    ///
    /// # Errors
    ///
    /// Returns the fetch error after recording its message in the view.
    pub async fn load(&self) -> Result<()> {
        self.state.write().begin();
        let result = self
            .scope
            .run(async { degrade_shape(self.api.carousel_images().await) })
            .await;

        match result {
            Ok(images) => {
                self.state.write().succeed(images);
                Ok(())
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                error!("Failed to fetch carousel images: {e}");
                let mut state = self.state.write();
                state.fail(e.user_message("fetch carousel images"));
                state.data.clear();
                Err(e)
            }
        }
    }

    /// Upload an image, then refetch
    ///
    /// # Errors
    ///
    /// Returns the upload error, or the refetch error if the upload
    /// succeeded but the list could not be reloaded.
    pub async fn upload(&self, upload: ImageUpload) -> Result<()> {
        let _guard = self.in_flight.claim(UPLOAD_CLAIM)?;
        let file_name = upload.file_name.clone();
        let result = self
            .scope
            .run(self.api.add_carousel_image(upload))
            .await;
        self.after_mutation(result, "upload image", || {
            info!(file = %file_name, "Carousel image uploaded");
            "Image uploaded successfully".to_string()
        })
        .await
    }

    /// Flip an image between Active and Inactive, then refetch
    ///
    /// The new state is computed here from `current_state` and sent as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] for a non-positive id without calling
    /// the server, otherwise the update or refetch error.
    pub async fn toggle(
        &self,
        image_id: CarouselImageId,
        current_state: CarouselState,
    ) -> Result<CarouselState> {
        self.guard_id(image_id)?;
        let _guard = self.in_flight.claim(image_id)?;
        let new_state = current_state.toggled();

        let result = self
            .scope
            .run(self.api.change_carousel_image_state(image_id, new_state))
            .await;
        self.after_mutation(result, "update image state", || {
            info!(image_id, %new_state, "Carousel image state changed");
            format!("Image {image_id} is now {new_state}")
        })
        .await?;
        Ok(new_state)
    }

    /// Toggle an image using the state currently on display
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] for a non-positive id and a validation
    /// error if the image is not on display, both without calling the
    /// server; otherwise see [`Self::toggle`].
    pub async fn toggle_listed(&self, image_id: CarouselImageId) -> Result<CarouselState> {
        self.guard_id(image_id)?;
        let current = self.state_of(image_id).ok_or_else(|| {
            Error::validation("image", format!("image {image_id} is not in the carousel"))
        })?;
        self.toggle(image_id, current).await
    }

    /// Delete an image, then refetch
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] for a non-positive id without calling
    /// the server, otherwise the delete or refetch error.
    pub async fn delete(&self, image_id: CarouselImageId) -> Result<()> {
        self.guard_id(image_id)?;
        let _guard = self.in_flight.claim(image_id)?;

        let result = self
            .scope
            .run(self.api.delete_carousel_image(image_id))
            .await;
        self.after_mutation(result, "delete image", || {
            info!(image_id, "Carousel image deleted");
            "Image deleted successfully".to_string()
        })
        .await
    }

    fn guard_id(&self, image_id: CarouselImageId) -> Result<()> {
        if image_id > 0 {
            return Ok(());
        }
        let e = Error::invalid_id("image");
        error!(image_id, "Refusing carousel action: {e}");
        self.state.write().error = Some(e.to_string());
        Err(e)
    }

    async fn after_mutation<T>(
        &self,
        result: Result<T>,
        action: &str,
        notice: impl FnOnce() -> String,
    ) -> Result<()> {
        match result {
            Ok(_) => {
                let notice = notice();
                self.load().await?;
                self.state.write().notice = Some(notice);
                Ok(())
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                error!("Failed to {action}: {e}");
                let mut state = self.state.write();
                state.error = Some(e.user_message(action));
                state.notice = None;
                Err(e)
            }
        }
    }

    /// Look up an image's current state on display
    pub fn state_of(&self, image_id: CarouselImageId) -> Option<CarouselState> {
        self.state
            .read()
            .data
            .iter()
            .find(|image| image.carousel_image_id == image_id)
            .map(|image| image.state)
    }

    /// Number of images shown on the homepage
    pub fn active_count(&self) -> usize {
        self.state.read().data.iter().filter(|i| i.is_active()).count()
    }

    /// A copy of the current view state
    pub fn snapshot(&self) -> ViewState<Vec<CarouselImage>> {
        self.state.read().clone()
    }

    /// Tear the view down, cancelling anything in flight
    pub fn teardown(&self) {
        self.scope.teardown();
    }

    pub(crate) fn scope(&self) -> &ViewScope {
        &self.scope
    }
}

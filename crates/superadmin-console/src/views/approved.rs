//! Approved admins and the per-admin hotel details panel

use super::{ViewState, degrade_shape};
use crate::gateway::SuperAdminApi;
use crate::scope::ViewScope;
use parking_lot::RwLock;
use std::sync::Arc;
use superadmin_core::types::AdminId;
use superadmin_core::{Error, Hotel, HotelAdmin, Result};
use tracing::{debug, error};

/// The details panel for one admin
#[derive(Debug, Clone, PartialEq)]
pub struct AdminDetails {
    /// The admin being inspected
    pub admin: HotelAdmin,
    /// Hotels that admin registered
    pub hotels: ViewState<Vec<Hotel>>,
}

/// The approved admins list
pub struct ApprovedAdmins {
    api: Arc<dyn SuperAdminApi>,
    scope: ViewScope,
    state: RwLock<ViewState<Vec<HotelAdmin>>>,
    details: RwLock<Option<AdminDetails>>,
}

impl std::fmt::Debug for ApprovedAdmins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovedAdmins")
            .field("state", &*self.state.read())
            .field("details", &*self.details.read())
            .finish_non_exhaustive()
    }
}

impl ApprovedAdmins {
    /// Create the view; nothing is fetched until [`Self::load`]
    pub fn new(api: Arc<dyn SuperAdminApi>) -> Self {
        Self {
            api,
            scope: ViewScope::new(),
            state: RwLock::new(ViewState::default()),
            details: RwLock::new(None),
        }
    }

    /// Fetch the approved list
    ///
    /// # Errors
    ///
    /// Returns the fetch error after recording its message in the view.
    pub async fn load(&self) -> Result<()> {
        self.state.write().begin();
        let result = self
            .scope
            .run(async { degrade_shape(self.api.approved_admins().await) })
            .await;

        match result {
            Ok(admins) => {
                self.state.write().succeed(admins);
                Ok(())
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                error!("Failed to fetch approved admins: {e}");
                let mut state = self.state.write();
                state.fail(e.user_message("fetch approved admins"));
                state.data.clear();
                Err(e)
            }
        }
    }

    /// Open the details panel for `admin_id` and load its hotels
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] if the admin is not in the list, or the
    /// fetch error after recording it in the panel.
    pub async fn open_details(&self, admin_id: AdminId) -> Result<()> {
        let admin = self
            .state
            .read()
            .data
            .iter()
            .find(|admin| admin.admin_id == admin_id)
            .cloned()
            .ok_or_else(|| Error::invalid_id("admin"))?;

        debug!(admin_id, "Opening admin details");
        *self.details.write() = Some(AdminDetails {
            admin,
            hotels: ViewState {
                loading: true,
                ..ViewState::default()
            },
        });

        let result = self
            .scope
            .run(async { degrade_shape(self.api.hotels_by_admin(admin_id).await) })
            .await;

        let mut details = self.details.write();
        // The panel may have been closed or switched while the fetch ran
        let Some(panel) = details.as_mut().filter(|d| d.admin.admin_id == admin_id) else {
            return result.map(|_| ());
        };
        match result {
            Ok(hotels) => {
                panel.hotels.succeed(hotels);
                Ok(())
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                error!(admin_id, "Failed to fetch admin hotels: {e}");
                panel.hotels.fail(e.user_message("fetch hotels"));
                Err(e)
            }
        }
    }

    /// Close the details panel
    pub fn close_details(&self) {
        *self.details.write() = None;
    }

    /// A copy of the details panel, if open
    pub fn details(&self) -> Option<AdminDetails> {
        self.details.read().clone()
    }

    /// A copy of the current view state
    pub fn snapshot(&self) -> ViewState<Vec<HotelAdmin>> {
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

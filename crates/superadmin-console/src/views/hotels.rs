//! Hotel management: district, "added by me" and search filters

use super::{ViewState, degrade_shape};
use crate::gateway::SuperAdminApi;
use crate::scope::ViewScope;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use superadmin_core::hotel::{ALL_DISTRICTS, HotelEdit, apply_local_edit, filter_by_district, filter_hotels};
use superadmin_core::{Error, Hotel, Result};
use tracing::{debug, error, info, warn};

/// Filters applied to the hotel list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelFilters {
    /// Local substring filter on name and address
    pub search_term: String,
    /// Selected district, [`ALL_DISTRICTS`] for none
    pub district: String,
    /// Only hotels registered by the signed-in admin
    pub added_by_me: bool,
}

impl Default for HotelFilters {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            district: ALL_DISTRICTS.to_string(),
            added_by_me: false,
        }
    }
}

/// The hotel management view
///
/// District and "added by me" select what is fetched; the search term only
/// narrows what is shown. Asking for "added by me" without a resolvable
/// admin identity fails closed: the filter stays off and the hotels already
/// on display are kept.
pub struct HotelManagement {
    api: Arc<dyn SuperAdminApi>,
    scope: ViewScope,
    state: RwLock<ViewState<Vec<Hotel>>>,
    districts: RwLock<Vec<String>>,
    filters: RwLock<HotelFilters>,
}

impl std::fmt::Debug for HotelManagement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotelManagement")
            .field("filters", &*self.filters.read())
            .field("hotels", &self.state.read().data.len())
            .finish_non_exhaustive()
    }
}

impl HotelManagement {
    /// Create the view; nothing is fetched until [`Self::load`]
    pub fn new(api: Arc<dyn SuperAdminApi>) -> Self {
        Self {
            api,
            scope: ViewScope::new(),
            state: RwLock::new(ViewState::default()),
            districts: RwLock::new(vec![ALL_DISTRICTS.to_string()]),
            filters: RwLock::new(HotelFilters::default()),
        }
    }

    /// Fetch the district list and the hotels for the current filters
    ///
    /// # Errors
    ///
    /// Returns the hotel fetch error, or an auth failure from either fetch.
    pub async fn load(&self) -> Result<()> {
        self.load_districts().await?;
        self.reload().await
    }

    /// Fetch district names for the picker
    ///
    /// A failure leaves only the "All Districts" entry and is not reported
    /// unless it ends the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] or an auth failure.
    pub async fn load_districts(&self) -> Result<()> {
        let result = self
            .scope
            .run(async { degrade_shape(self.api.districts().await) })
            .await;

        match result {
            Ok(names) => {
                let mut districts = vec![ALL_DISTRICTS.to_string()];
                districts.extend(names.into_iter().filter(|name| name != ALL_DISTRICTS));
                *self.districts.write() = districts;
                Ok(())
            }
            Err(e) if matches!(e, Error::Cancelled) || e.is_auth_failure() => Err(e),
            Err(e) => {
                warn!("Failed to fetch districts: {e}");
                Ok(())
            }
        }
    }

    /// Fetch hotels for the current district and "added by me" filters
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdentityUnavailable`] if "added by me" is on but no
    /// identity resolves (the displayed hotels are kept), otherwise the fetch
    /// error after recording its message.
    pub async fn reload(&self) -> Result<()> {
        let filters = self.filters.read().clone();
        self.state.write().begin();

        let result = self.scope.run(self.fetch(&filters)).await;
        match result {
            Ok(hotels) => {
                debug!(
                    count = hotels.len(),
                    district = %filters.district,
                    added_by_me = filters.added_by_me,
                    "Hotels loaded"
                );
                self.state.write().succeed(hotels);
                Ok(())
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(Error::IdentityUnavailable) => {
                warn!("Admin identity unavailable, keeping current hotels");
                self.state.write().fail(Error::IdentityUnavailable.to_string());
                Err(Error::IdentityUnavailable)
            }
            Err(e) => {
                error!("Failed to fetch hotels: {e}");
                let mut state = self.state.write();
                state.fail(e.user_message("fetch hotels"));
                state.data.clear();
                Err(e)
            }
        }
    }

    async fn fetch(&self, filters: &HotelFilters) -> Result<Vec<Hotel>> {
        if filters.added_by_me {
            let identity = self.api.session().resolve_admin_identity();
            if identity.is_empty() {
                return Err(Error::IdentityUnavailable);
            }
            let mine = degrade_shape(self.api.hotels_added_by(&identity).await)?;
            return Ok(filter_by_district(mine, &filters.district));
        }

        if filters.district == ALL_DISTRICTS {
            degrade_shape(self.api.all_hotels().await)
        } else {
            degrade_shape(self.api.hotels_by_district(&filters.district).await)
        }
    }

    /// Select a district and refetch
    ///
    /// # Errors
    ///
    /// See [`Self::reload`].
    pub async fn set_district(&self, district: impl Into<String>) -> Result<()> {
        let district = district.into();
        let district = if district.trim().is_empty() {
            ALL_DISTRICTS.to_string()
        } else {
            district
        };
        self.filters.write().district = district;
        self.reload().await
    }

    /// Turn "added by me" on or off and refetch
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdentityUnavailable`] when turning the filter on
    /// without an identity; the filter stays off and nothing is fetched.
    pub async fn set_added_by_me(&self, enabled: bool) -> Result<()> {
        if enabled {
            self.require_identity()?;
        }
        self.filters.write().added_by_me = enabled;
        self.reload().await
    }

    /// Replace all filters at once and refetch
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_added_by_me`] when `filters.added_by_me` is set
    /// without an identity (no filter changes), otherwise see [`Self::reload`].
    pub async fn apply_filters(&self, filters: HotelFilters) -> Result<()> {
        if filters.added_by_me {
            self.require_identity()?;
        }
        let district = if filters.district.trim().is_empty() {
            ALL_DISTRICTS.to_string()
        } else {
            filters.district
        };
        *self.filters.write() = HotelFilters { district, ..filters };
        self.reload().await
    }

    fn require_identity(&self) -> Result<()> {
        if self.api.session().resolve_admin_identity().is_empty() {
            warn!("\"Added by me\" requested without an admin identity");
            self.state.write().error = Some(Error::IdentityUnavailable.to_string());
            return Err(Error::IdentityUnavailable);
        }
        Ok(())
    }

    /// Change the search term; filtering is local and nothing is fetched
    pub fn set_search_term(&self, term: impl Into<String>) {
        self.filters.write().search_term = term.into();
    }

    /// Apply an operator edit to a displayed hotel
    ///
    /// Returns whether a hotel with `hotel_id` was on display.
    pub fn apply_edit(&self, hotel_id: &str, edit: HotelEdit) -> bool {
        let mut state = self.state.write();
        let applied = apply_local_edit(&mut state.data, hotel_id, edit, Utc::now());
        if applied {
            info!(hotel_id, "Hotel updated");
            state.notice = Some("Hotel updated successfully".to_string());
        }
        applied
    }

    /// Hotels matching the search term, in fetch order
    pub fn visible(&self) -> Vec<Hotel> {
        let term = self.filters.read().search_term.clone();
        let state = self.state.read();
        filter_hotels(&state.data, &term).cloned().collect()
    }

    /// `Showing N of M hotels`
    pub fn summary(&self) -> String {
        let term = self.filters.read().search_term.clone();
        let state = self.state.read();
        let shown = filter_hotels(&state.data, &term).count();
        format!("Showing {shown} of {} hotels", state.data.len())
    }

    /// District names for the picker, "All Districts" first
    pub fn districts(&self) -> Vec<String> {
        self.districts.read().clone()
    }

    /// The current filters
    pub fn filters(&self) -> HotelFilters {
        self.filters.read().clone()
    }

    /// A copy of the current view state
    pub fn snapshot(&self) -> ViewState<Vec<Hotel>> {
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

//! Every registered admin, pending or approved, with a details lookup

use super::{ViewState, degrade_shape};
use crate::gateway::SuperAdminApi;
use crate::scope::ViewScope;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use superadmin_core::types::{AdminId, AdminStatus};
use superadmin_core::{Error, HotelAdmin, Result};
use tracing::{debug, error};

/// One registration and the list it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    /// The registration
    pub admin: HotelAdmin,
    /// Pending or approved; the server does not list rejected registrations
    pub status: AdminStatus,
}

/// The all-users section
///
/// Pending and approved lists are fetched together. An admin approved
/// between the two responses can show up in both; the approved record wins.
pub struct UserDirectory {
    api: Arc<dyn SuperAdminApi>,
    scope: ViewScope,
    state: RwLock<ViewState<Vec<UserEntry>>>,
}

impl std::fmt::Debug for UserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDirectory")
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl UserDirectory {
    /// Create the view; nothing is fetched until [`Self::load`]
    pub fn new(api: Arc<dyn SuperAdminApi>) -> Self {
        Self {
            api,
            scope: ViewScope::new(),
            state: RwLock::new(ViewState::default()),
        }
    }

    /// Fetch both lists
    ///
    /// # Errors
    ///
    /// Returns the first fetch error after recording its message in the
    /// view; nothing is shown unless both lists arrive.
    pub async fn load(&self) -> Result<()> {
        self.state.write().begin();
        let result = self
            .scope
            .run(async {
                let (pending, approved) =
                    tokio::join!(self.api.pending_admins(), self.api.approved_admins());
                Ok::<_, Error>((degrade_shape(pending)?, degrade_shape(approved)?))
            })
            .await;

        match result {
            Ok((pending, approved)) => {
                let entries = merge(pending, approved);
                debug!(users = entries.len(), "Loaded user directory");
                self.state.write().succeed(entries);
                Ok(())
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                error!("Failed to fetch users: {e}");
                let mut state = self.state.write();
                state.fail(e.user_message("fetch users"));
                state.data.clear();
                Err(e)
            }
        }
    }

    /// Registrations with `status`, or all of them
    pub fn entries(&self, status: Option<AdminStatus>) -> Vec<UserEntry> {
        self.state
            .read()
            .data
            .iter()
            .filter(|entry| status.is_none_or(|wanted| entry.status == wanted))
            .cloned()
            .collect()
    }

    /// How many listed registrations have `status`
    pub fn count(&self, status: AdminStatus) -> usize {
        self.state
            .read()
            .data
            .iter()
            .filter(|entry| entry.status == status)
            .count()
    }

    /// The full record for one admin
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidId`] if the admin is not listed.
    pub fn details(&self, admin_id: AdminId) -> Result<UserEntry> {
        self.state
            .read()
            .data
            .iter()
            .find(|entry| entry.admin.admin_id == admin_id)
            .cloned()
            .ok_or_else(|| Error::invalid_id("user"))
    }

    /// A copy of the current view state
    pub fn snapshot(&self) -> ViewState<Vec<UserEntry>> {
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

fn merge(pending: Vec<HotelAdmin>, approved: Vec<HotelAdmin>) -> Vec<UserEntry> {
    let approved_ids: HashSet<AdminId> = approved.iter().map(|admin| admin.admin_id).collect();
    pending
        .into_iter()
        .filter(|admin| !approved_ids.contains(&admin.admin_id))
        .map(|admin| UserEntry {
            admin,
            status: AdminStatus::Pending,
        })
        .chain(approved.into_iter().map(|admin| UserEntry {
            admin,
            status: AdminStatus::Approved,
        }))
        .collect()
}

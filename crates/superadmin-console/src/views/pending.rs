//! Pending admin registrations and the approve/reject workflow

use super::{ViewState, degrade_shape};
use crate::gateway::SuperAdminApi;
use crate::scope::{InFlight, ViewScope};
use parking_lot::RwLock;
use std::sync::Arc;
use superadmin_core::types::{AdminId, AdminStatus};
use superadmin_core::{Error, HotelAdmin, Result};
use tracing::{error, info};

/// A decision on a pending registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Allow the admin in
    Approve,
    /// Refuse the registration
    Reject,
}

impl Decision {
    /// Status the admin ends up in
    pub const fn status(self) -> AdminStatus {
        match self {
            Self::Approve => AdminStatus::Approved,
            Self::Reject => AdminStatus::Rejected,
        }
    }

    const fn verb(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// The pending approvals list
///
/// A decided admin leaves the list only after the server confirms the
/// decision. A failed decision leaves the list exactly as it was and shows
/// the error.
pub struct PendingApprovals {
    api: Arc<dyn SuperAdminApi>,
    scope: ViewScope,
    state: RwLock<ViewState<Vec<HotelAdmin>>>,
    in_flight: InFlight,
}

impl std::fmt::Debug for PendingApprovals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingApprovals")
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl PendingApprovals {
    /// Create the view; nothing is fetched until [`Self::load`]
    pub fn new(api: Arc<dyn SuperAdminApi>) -> Self {
        Self {
            api,
            scope: ViewScope::new(),
            state: RwLock::new(ViewState::default()),
            in_flight: InFlight::new(),
        }
    }

    /// Fetch the pending list
    ///
    /// # Errors
    ///
    /// Returns the fetch error after recording its message in the view.
    pub async fn load(&self) -> Result<()> {
        self.state.write().begin();
        let result = self
            .scope
            .run(async { degrade_shape(self.api.pending_admins().await) })
            .await;

        match result {
            Ok(admins) => {
                self.state.write().succeed(admins);
                Ok(())
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                error!("Failed to fetch pending requests: {e}");
                let mut state = self.state.write();
                state.fail(e.user_message("fetch pending requests"));
                state.data.clear();
                Err(e)
            }
        }
    }

    /// Approve a pending admin
    ///
    /// # Errors
    ///
    /// See [`Self::decide`].
    pub async fn approve(&self, admin_id: AdminId) -> Result<AdminStatus> {
        self.decide(admin_id, Decision::Approve).await
    }

    /// Reject a pending admin
    ///
    /// # Errors
    ///
    /// See [`Self::decide`].
    pub async fn reject(&self, admin_id: AdminId) -> Result<AdminStatus> {
        self.decide(admin_id, Decision::Reject).await
    }

    /// Send a decision and drop the admin from the list once it is accepted
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutationInFlight`] if a decision for the same admin
    /// has not finished, otherwise the gateway error. The list is untouched
    /// on any error.
    pub async fn decide(&self, admin_id: AdminId, decision: Decision) -> Result<AdminStatus> {
        let _guard = self.in_flight.claim(admin_id)?;

        let result = self
            .scope
            .run(async {
                match decision {
                    Decision::Approve => self.api.approve_admin(admin_id).await,
                    Decision::Reject => self.api.reject_admin(admin_id).await,
                }
            })
            .await;

        let status = decision.status();
        match result {
            Ok(outcome) => {
                info!(admin_id, %status, "Admin decision recorded");
                let mut state = self.state.write();
                state.data.retain(|admin| admin.admin_id != admin_id);
                state.error = None;
                state.notice = Some(
                    outcome
                        .message()
                        .unwrap_or_else(|| format!("Admin {admin_id} {status}")),
                );
                Ok(status)
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                error!(admin_id, "Failed to {} admin: {e}", decision.verb());
                let mut state = self.state.write();
                state.error = Some(e.user_message(&format!("{} admin", decision.verb())));
                state.notice = None;
                Err(e)
            }
        }
    }

    /// A copy of the current view state
    pub fn snapshot(&self) -> ViewState<Vec<HotelAdmin>> {
        self.state.read().clone()
    }

    /// Ids currently on display, in order
    pub fn admin_ids(&self) -> Vec<AdminId> {
        self.state.read().data.iter().map(|a| a.admin_id).collect()
    }

    /// Tear the view down, cancelling anything in flight
    pub fn teardown(&self) {
        self.scope.teardown();
    }

    pub(crate) fn scope(&self) -> &ViewScope {
        &self.scope
    }
}

//! View models for the dashboard sections
//!
//! Each view owns a [`ViewScope`](crate::scope::ViewScope), fetches on
//! mount, and keeps its state behind a lock that is never held across an
//! await. Mutating actions take `&self` so several can be started at once;
//! the per-record in-flight guard decides which of them proceed.

pub mod approved;
pub mod carousel;
pub mod hotels;
pub mod overview;
pub mod pending;
pub mod users;

pub use approved::{AdminDetails, ApprovedAdmins};
pub use carousel::CarouselManager;
pub use hotels::{HotelFilters, HotelManagement};
pub use overview::{Overview, OverviewStats};
pub use pending::{Decision, PendingApprovals};
pub use users::{UserDirectory, UserEntry};

use superadmin_core::{Error, Result};
use tracing::warn;

/// What a view shows: its data plus loading and message flags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState<T> {
    /// A fetch is in progress
    pub loading: bool,
    /// Message for the last failure, cleared by the next success
    pub error: Option<String>,
    /// Message for the last successful action
    pub notice: Option<String>,
    /// The records on display
    pub data: T,
}

impl<T> ViewState<T> {
    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self, data: T) {
        self.loading = false;
        self.error = None;
        self.data = data;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }
}

/// Show nothing, rather than fail, when a list endpoint answers with a body
/// the decoder does not recognise
pub(crate) fn degrade_shape<T>(result: Result<Vec<T>>) -> Result<Vec<T>> {
    match result {
        Err(Error::UnexpectedShape { endpoint, detail }) => {
            warn!(%endpoint, %detail, "Unexpected response shape, showing no records");
            Ok(Vec::new())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_state_transitions() {
        let mut state: ViewState<Vec<i32>> = ViewState::default();
        state.fail("boom".to_string());
        state.begin();
        assert!(state.loading);
        assert_eq!(state.error, None);

        state.succeed(vec![1, 2]);
        assert!(!state.loading);
        assert_eq!(state.data, vec![1, 2]);
    }

    #[test]
    fn test_degrade_shape_only_swallows_shape_errors() {
        let degraded = degrade_shape::<i32>(Err(Error::unexpected_shape("/x", "object")));
        assert_eq!(degraded.unwrap(), Vec::<i32>::new());

        let network = degrade_shape::<i32>(Err(Error::network("refused")));
        assert!(matches!(network, Err(Error::Network(_))));

        assert_eq!(degrade_shape(Ok(vec![3])).unwrap(), vec![3]);
    }
}

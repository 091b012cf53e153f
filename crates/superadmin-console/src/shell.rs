//! Section switching and session lifecycle

use crate::gateway::SuperAdminApi;
use crate::scope::ViewScope;
use crate::views::{
    ApprovedAdmins, CarouselManager, HotelManagement, Overview, PendingApprovals, UserDirectory,
};
use std::sync::Arc;
use superadmin_core::{Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// A dashboard section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Headline numbers
    Overview,
    /// Registrations awaiting a decision
    PendingApprovals,
    /// Approved admins and their hotels
    ApprovedAdmins,
    /// Every registration, pending or approved
    AllUsers,
    /// Hotel browsing and filtering
    HotelManagement,
    /// Homepage carousel
    Carousel,
}

impl Section {
    /// Every section in menu order
    pub const ALL: [Self; 6] = [
        Self::Overview,
        Self::PendingApprovals,
        Self::ApprovedAdmins,
        Self::AllUsers,
        Self::HotelManagement,
        Self::Carousel,
    ];

    /// Command-line name
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::PendingApprovals => "pending",
            Self::ApprovedAdmins => "approved-admins",
            Self::AllUsers => "all-users",
            Self::HotelManagement => "hotel-management",
            Self::Carousel => "carousel",
        }
    }

    /// Heading shown above the section
    pub const fn title(self) -> &'static str {
        match self {
            Self::Overview => "Dashboard Overview",
            Self::PendingApprovals => "Pending Approvals",
            Self::ApprovedAdmins => "Approved Admins",
            Self::AllUsers => "All Registered Users",
            Self::HotelManagement => "Hotel Management",
            Self::Carousel => "Carousel Management",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for Section {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation("section", format!("unknown section '{s}'")))
    }
}

/// The view mounted for the active section
#[derive(Debug)]
pub enum ActiveView {
    /// Overview
    Overview(Overview),
    /// Pending approvals
    Pending(PendingApprovals),
    /// Approved admins
    Approved(ApprovedAdmins),
    /// All registered users
    Users(UserDirectory),
    /// Hotel management
    Hotels(HotelManagement),
    /// Carousel
    Carousel(CarouselManager),
}

impl ActiveView {
    fn new(section: Section, api: Arc<dyn SuperAdminApi>) -> Self {
        match section {
            Section::Overview => Self::Overview(Overview::new(api)),
            Section::PendingApprovals => Self::Pending(PendingApprovals::new(api)),
            Section::ApprovedAdmins => Self::Approved(ApprovedAdmins::new(api)),
            Section::AllUsers => Self::Users(UserDirectory::new(api)),
            Section::HotelManagement => Self::Hotels(HotelManagement::new(api)),
            Section::Carousel => Self::Carousel(CarouselManager::new(api)),
        }
    }

    /// Initial fetch for the view
    async fn mount(&self) -> Result<()> {
        match self {
            Self::Overview(view) => view.load().await,
            Self::Pending(view) => view.load().await,
            Self::Approved(view) => view.load().await,
            Self::Users(view) => view.load().await,
            Self::Hotels(view) => view.load().await,
            Self::Carousel(view) => view.load().await,
        }
    }

    fn scope(&self) -> &ViewScope {
        match self {
            Self::Overview(view) => view.scope(),
            Self::Pending(view) => view.scope(),
            Self::Approved(view) => view.scope(),
            Self::Users(view) => view.scope(),
            Self::Hotels(view) => view.scope(),
            Self::Carousel(view) => view.scope(),
        }
    }
}

/// Holds the active section and decides what is mounted
///
/// Only one view is mounted at a time. Switching sections tears the old
/// view down before the new one fetches. Any auth failure reported through
/// [`Shell::report`] ends the session.
pub struct Shell {
    api: Arc<dyn SuperAdminApi>,
    authenticated: bool,
    active_section: Section,
    view: Option<ActiveView>,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("authenticated", &self.authenticated)
            .field("active_section", &self.active_section)
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}

impl Shell {
    /// Create a shell; it starts authenticated if the session holds a token
    pub fn new(api: Arc<dyn SuperAdminApi>) -> Self {
        let authenticated = api.session().is_authenticated();
        Self {
            api,
            authenticated,
            active_section: Section::Overview,
            view: None,
        }
    }

    /// Whether a session is active
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// The section last navigated to
    pub const fn active_section(&self) -> Section {
        self.active_section
    }

    /// Start a session with `token`
    ///
    /// # Errors
    ///
    /// Returns an error if the token is blank or cannot be stored.
    pub fn login(&mut self, token: &str) -> Result<()> {
        self.api.session().set_token(token)?;
        self.authenticated = true;
        info!("Logged in");
        Ok(())
    }

    /// End the session and unmount the active view
    ///
    /// # Errors
    ///
    /// Returns an error if the stored token cannot be removed; the shell is
    /// logged out regardless.
    pub fn logout(&mut self) -> Result<()> {
        if let Some(view) = self.view.take() {
            view.scope().teardown();
        }
        self.authenticated = false;
        self.active_section = Section::Overview;
        info!("Logged out");
        self.api.session().invalidate()
    }

    /// Switch to `section` and run its initial fetch
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] when logged out, otherwise the view's
    /// load error (an auth failure also logs the shell out).
    pub async fn navigate(&mut self, section: Section) -> Result<()> {
        self.switch(section)?;
        let result = match &self.view {
            Some(view) => view.mount().await,
            None => Ok(()),
        };
        self.report(result)
    }

    /// Switch to `section` without fetching anything yet
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] when logged out.
    pub fn switch(&mut self, section: Section) -> Result<()> {
        if !self.authenticated {
            return Err(Error::Unauthorized { status: 401 });
        }

        if let Some(previous) = self.view.take() {
            previous.scope().teardown();
        }
        info!(section = %section, "Switching section");
        self.active_section = section;
        self.view = Some(ActiveView::new(section, Arc::clone(&self.api)));
        Ok(())
    }

    /// Pass a result through, logging out on an auth failure
    ///
    /// # Errors
    ///
    /// Returns `result` unchanged.
    pub fn report<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result
            && e.is_auth_failure()
            && self.authenticated
        {
            warn!("Session rejected by the server: {e}");
            if let Err(logout_error) = self.logout() {
                warn!("Failed to clear session: {logout_error}");
            }
        }
        result
    }

    /// The mounted view, if any
    pub const fn view(&self) -> Option<&ActiveView> {
        self.view.as_ref()
    }

    /// The pending approvals view, if mounted
    pub const fn pending(&self) -> Option<&PendingApprovals> {
        match &self.view {
            Some(ActiveView::Pending(view)) => Some(view),
            _ => None,
        }
    }

    /// The approved admins view, if mounted
    pub const fn approved(&self) -> Option<&ApprovedAdmins> {
        match &self.view {
            Some(ActiveView::Approved(view)) => Some(view),
            _ => None,
        }
    }

    /// The all-users view, if mounted
    pub const fn users(&self) -> Option<&UserDirectory> {
        match &self.view {
            Some(ActiveView::Users(view)) => Some(view),
            _ => None,
        }
    }

    /// The hotel management view, if mounted
    pub const fn hotels(&self) -> Option<&HotelManagement> {
        match &self.view {
            Some(ActiveView::Hotels(view)) => Some(view),
            _ => None,
        }
    }

    /// The carousel view, if mounted
    pub const fn carousel(&self) -> Option<&CarouselManager> {
        match &self.view {
            Some(ActiveView::Carousel(view)) => Some(view),
            _ => None,
        }
    }

    /// The overview, if mounted
    pub const fn overview(&self) -> Option<&Overview> {
        match &self.view {
            Some(ActiveView::Overview(view)) => Some(view),
            _ => None,
        }
    }

    /// A handle that tears the mounted view down, e.g. on Ctrl-C
    pub fn cancel_handle(&self) -> Option<CancellationToken> {
        self.view.as_ref().map(|view| view.scope().handle())
    }
}

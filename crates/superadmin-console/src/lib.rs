//! Hotel super-admin console
//!
//! The HTTP gateway to the hotel API, a view model per dashboard section,
//! and the shell that mounts one section at a time. The `superadmin` binary
//! drives all of it from the command line.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod gateway;
pub mod mock;
pub mod render;
pub mod scope;
pub mod shell;
pub mod views;

// Re-export commonly used types
pub use gateway::{ApiClient, ImageUpload, SuperAdminApi};
pub use scope::{InFlight, ViewScope};
pub use shell::{ActiveView, Section, Shell};
pub use views::ViewState;

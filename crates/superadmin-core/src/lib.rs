//! Core types and logic for the hotel super-admin console
//!
//! Nothing in this crate touches the network. It holds the wire types, the
//! response decoders, the session token accessor and the hotel
//! normalization/filtering used by the hotel management view.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod decode;
pub mod error;
pub mod hotel;
pub mod session;
pub mod types;
mod wire;

// Re-export commonly used types
pub use config::{Config, LoggingConfig};
pub use error::{Error, Result};
pub use session::{FileStore, MemoryStore, Session, TokenStore};
pub use types::{CarouselImage, CarouselState, Hotel, HotelAdmin, RawHotel};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level. The format is JSON
/// when `logging.format` is `json` and human-readable otherwise.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| Error::configuration(format!("invalid log level '{}': {e}", config.level)))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| Error::configuration(format!("failed to install logger: {e}")))
}

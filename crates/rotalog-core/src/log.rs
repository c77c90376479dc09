//! Diagnostics output of rotalog itself.
//!
//! rotalog reports rotations, skipped destinations and failed writes through
//! `tracing`. Applications that already install a subscriber get those events
//! there; the rest can call [`init_default`].

use rotalog_types::{RotalogError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a formatting subscriber for rotalog's own events.
///
/// The filter is taken from `RUST_LOG` and defaults to `rotalog=info`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_default() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rotalog=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| RotalogError::Other(format!("Failed to install subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_default_only_once() {
        assert!(init_default().is_ok());
        assert!(init_default().is_err());
    }
}

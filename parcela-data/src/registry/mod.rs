//! HTTP adapter for the cadastral registry's public JSON services.
//!
//! [`RegistryClient`] implements both [`parcela_core::ParcelLocator`] (the
//! coordinate distance search) and [`parcela_core::ParcelDetailSource`] (the
//! non-protected parcel data lookup). Payload decoding is kept in pure
//! functions so it can be exercised without a server.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use parcela_core::{ProjectedPoint, Resolver};
//! use parcela_data::{RegistryClient, RegistryClientConfig};
//!
//! let config = RegistryClientConfig::new("https://ovc.catastro.meh.es")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("my-app/1.0");
//! let client = RegistryClient::with_config(config)?;
//!
//! let resolver = Resolver::new(&client, &client);
//! let point = ProjectedPoint::new(440_000.0, 4_474_000.0, "EPSG:25830")?;
//! let outcome = resolver.resolve(&point);
//! println!("{:?}", outcome.reference);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod detail;
mod distance;
mod envelope;

pub use client::{
    ClientBuildError, DEFAULT_BASE_URL, DEFAULT_MULTIPLE_RESULTS_CODES, DEFAULT_NOT_FOUND_CODES,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, RegistryClient, RegistryClientConfig,
};
pub use detail::DetailStrategy;

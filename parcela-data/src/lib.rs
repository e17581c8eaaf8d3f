//! Registry access for the Parcela engine.
//!
//! Responsibilities:
//! - Provide [`RegistryClient`], the HTTP adapter implementing
//!   [`parcela_core::ParcelLocator`] and [`parcela_core::ParcelDetailSource`].
//! - Decode drifting registry payloads through [`NormalizedExtractor`].
//! - Extract parcel details through an ordered list of [`DetailStrategy`]
//!   values.
//!
//! Boundaries:
//! - Do not encode resolution rules (live in `parcela-core`).
//! - Expose synchronous trait methods; async I/O stays inside the client.
//!
//! Invariants:
//! - One upstream request per trait call; no retries and no caching.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod extract;
pub mod registry;

pub use extract::NormalizedExtractor;
pub use registry::{
    ClientBuildError, DEFAULT_BASE_URL, DEFAULT_MULTIPLE_RESULTS_CODES, DEFAULT_NOT_FOUND_CODES,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, DetailStrategy, RegistryClient,
    RegistryClientConfig,
};

//! Facade crate for the Parcela cadastral resolution engine.
//!
//! This crate re-exports the core domain types and the resolver, and exposes
//! the HTTP registry client behind the `http` feature.

#![forbid(unsafe_code)]

pub use parcela_core::{
    CandidateOrder, DetailLookup, Located, ParcelCandidate, ParcelDetail, ParcelDetailSource,
    ParcelLocator, ParcelReference, PointError, ProjectedPoint, RegistryError, ResolutionOutcome,
    Resolver, ResolverOptions, RingSearch, RingSearchOutcome, RingSearchPolicy,
};

#[cfg(feature = "test-support")]
pub use parcela_core::test_support;

#[cfg(feature = "http")]
pub use parcela_data::{ClientBuildError, DetailStrategy, RegistryClient, RegistryClientConfig};

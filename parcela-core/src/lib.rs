//! Core domain types and resolution logic for the Parcela engine.
//!
//! Responsibilities:
//! - Model projected points, parcel references, candidates and details.
//! - Define the [`ParcelLocator`] and [`ParcelDetailSource`] traits that
//!   registry adapters implement.
//! - Drive the expanding [`RingSearch`] and the top-level [`Resolver`].
//!
//! Boundaries:
//! - No network access; adapters live in `parcela-data`.
//! - Coordinates are taken as already projected into the requested
//!   reference system.
//!
//! Invariants:
//! - Resolution is total: [`Resolver::resolve`] always returns a
//!   [`ResolutionOutcome`].
//! - No global mutable state.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod parcel;
mod point;
pub mod registry;
pub mod resolution;
pub mod ring_search;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use parcel::{ParcelCandidate, ParcelDetail, ParcelReference};
pub use point::{PointError, ProjectedPoint};
pub use registry::{DetailLookup, Located, ParcelDetailSource, ParcelLocator, RegistryError};
pub use resolution::{
    CandidateOrder, ResolutionOutcome, Resolver, ResolverOptions, UnknownCandidateOrder,
};
pub use ring_search::{
    ProbeLattice, RingSearch, RingSearchOutcome, RingSearchPolicy, RingSearchPolicyError,
    SearchProbe,
};

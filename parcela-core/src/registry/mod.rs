//! Read-only access to the cadastral registry.
//!
//! The [`ParcelLocator`] trait answers "which parcels lie near this point"
//! and the [`ParcelDetailSource`] trait answers "what is known about this
//! parcel". Both are synchronous so the resolution engine stays embeddable
//! in synchronous contexts; adapters that speak HTTP block internally.
//!
//! Errors separate functional failures reported by the registry itself
//! from transport failures, see [`RegistryError::is_transport`].

mod error;
mod source;

pub use error::RegistryError;
pub use source::{DetailLookup, Located, ParcelDetailSource, ParcelLocator};

//! Vendor abstractions and the provider catalog.
//!
//! This module contains:
//! - The `VendorClient` trait that every vendor adapter implements
//! - Static provider facts: tier, priority and scoring features
//! - The immutable `ProviderCatalog` shared by every other component
//!
//! # Architecture
//!
//! Concrete vendor clients live outside this crate. Each adapter declares
//! the subset of operations it implements through [`ClientCapabilities`];
//! the gateway never probes an adapter for methods it did not declare.

mod capabilities;
mod catalog;
mod descriptor;
mod traits;

pub use capabilities::{ClientCapabilities, Operation, ProviderFeatures, RequestsPerMinute};
pub use catalog::ProviderCatalog;
pub use descriptor::{ProviderDescriptor, ProviderTier};
pub use traits::VendorClient;

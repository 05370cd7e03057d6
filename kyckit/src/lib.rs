//! Mobile bindings for `kyckit-core`.
//!
//! This crate only re-exports the core scaffolding so a single library can be
//! handed to `uniffi-bindgen` for Swift and Kotlin generation.
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

pub use kyckit_core::*;

kyckit_core::uniffi_reexport_scaffolding!();

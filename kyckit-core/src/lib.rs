//! Client layer for the KYC onboarding flow.
//!
//! Start from [`KycClient`], which wires the session store, the backend
//! client, the endpoint services and the [`kyc::KycFlow`] controller over a
//! host-provided [`storage::KeyValueBackend`].
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

mod client;
pub use client::KycClient;

mod defaults;
pub use defaults::*;

mod error;
pub use error::*;

mod types;
pub use types::*;

pub mod api;
pub mod cache;
pub mod kyc;
pub mod logger;
pub mod services;
pub mod session;
pub mod storage;

// private modules
mod http_request;

uniffi::setup_scaffolding!("kyckit_core");

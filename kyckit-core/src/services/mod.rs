//! Bindings for the backend endpoints, grouped by area.

mod auth;
mod documents;
mod health;
mod kyc;
mod user;

pub use auth::AuthService;
pub use documents::{DocumentService, DocumentUpload};
pub(crate) use documents::validate_upload;
pub use kyc::KycService;
pub use user::UserService;

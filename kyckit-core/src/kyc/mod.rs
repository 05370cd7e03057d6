//! KYC onboarding: progress model, transition function and the flow
//! controller that ties them to the backend and local storage.

mod flow;
mod machine;
mod types;

pub use flow::{KycFlow, KycObserver};
pub use machine::KycEvent;
pub use types::*;

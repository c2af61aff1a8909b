//! Domain services
//!
//! Business rules shared across application services.

mod authorization;

pub use authorization::AuthorizationGate;

//! Caller authentication and upload authorization.

pub mod bearer;
pub mod gate;
pub mod jwt;

pub use bearer::BearerToken;
pub use gate::UploadGate;
pub use jwt::{AccessClaims, IdentityValidator, JwtIdentityValidator};

// Authentication module
// Verifies bearer JWTs issued by the account service and exposes the caller's identity

pub mod error;
pub mod middleware;
pub mod models;
pub mod token;

pub use error::AuthError;
pub use middleware::{AdminUser, AuthenticatedUser};
pub use models::Role;
pub use token::{Claims, TokenService};

// Authentication module
// Verifies owner JWTs issued by the account service

pub mod error;
pub mod middleware;
pub mod token;

pub use error::AuthError;
pub use middleware::AuthenticatedUser;
pub use token::{Claims, TokenService};

// Orders module
// Placement, status changes, deletion with stock restitution, and listing

pub mod error;
pub mod handlers;
pub mod models;
pub mod number;
pub mod price_calculator;
pub mod query;
pub mod repository;
pub mod service;

pub use error::*;
pub use handlers::*;
pub use models::*;
pub use number::*;
pub use price_calculator::*;
pub use query::*;
pub use repository::*;
pub use service::*;

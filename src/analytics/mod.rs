// Sales analytics module
// Dashboard totals, paginated listing, period metrics and monthly breakdown

pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::*;
pub use models::*;
pub use service::*;

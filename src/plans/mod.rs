pub mod handlers;
pub mod policy;
pub mod usage;

pub use handlers::*;
pub use policy::*;
pub use usage::*;

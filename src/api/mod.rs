pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod types;

pub use error::ApiError;
pub use router::{cors_layer, create_router};
pub use types::*;

pub mod crypto;
pub mod insights;
pub mod market;
pub mod news;
pub mod routes;

pub use routes::{create_router, AppState};

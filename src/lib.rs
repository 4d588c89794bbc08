pub mod app;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use error::{DeliveryError, ErrorKind, GameError};
pub use state::AppState;

pub mod audit;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod registry;

pub use error::RegistryError;
pub use handlers::{router, AppState};
pub use registry::EmployeeRegistry;

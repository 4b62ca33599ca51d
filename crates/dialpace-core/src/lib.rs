pub mod config;
pub mod env;
pub mod error;
pub mod field;

pub use config::PacingConfig;
pub use env::Environment;
pub use error::EnvironmentError;
pub use field::Field;

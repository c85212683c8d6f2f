pub mod config;
pub mod dates;
pub mod outcome;

pub use config::AppConfig;
pub use outcome::Outcome;

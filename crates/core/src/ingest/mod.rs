pub mod error;
pub mod fallback;
pub mod provider;
pub mod synthetic;
pub mod types;

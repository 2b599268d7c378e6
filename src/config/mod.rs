#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use env::{Credentials, Environment};
pub use toml_config::{Settings, Timeouts};

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::{Environment, Settings};

pub use adapters::{ChromiumDriver, LaunchOptions};
pub use core::engine::{EngineOptions, IpoEngine};
pub use domain::model::{Offer, RunMode, RunReport};
pub use utils::error::{PortalError, Result};

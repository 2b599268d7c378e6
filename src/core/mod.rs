pub mod applier;
pub mod auth;
pub mod engine;
pub mod navigator;
pub mod offers;

pub use crate::domain::model::{Offer, RunMode, RunReport};
pub use crate::domain::ports::{Locator, PortalDriver};
pub use crate::utils::error::Result;

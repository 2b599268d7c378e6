// Domain layer: offer model and the browser port the workflow drives.

pub mod model;
pub mod ports;
pub mod selectors;

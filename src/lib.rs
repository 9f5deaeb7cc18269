pub mod algorithms;
pub mod analysis;
pub mod config;
pub mod data;
pub mod logging;
pub mod orientation;
pub mod pipeline;
pub mod utils;

pub use algorithms::*;
pub use analysis::*;
pub use data::*;
pub use orientation::*;
pub use pipeline::*;

pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

pub mod aggregate;
pub mod classify;
pub mod compensate;
pub mod estimate;
pub mod severity;

pub use aggregate::*;
pub use classify::*;
pub use compensate::*;
pub use estimate::*;
pub use severity::*;

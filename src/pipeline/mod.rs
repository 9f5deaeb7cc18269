pub mod batch;
pub mod builder;
pub mod error;
pub mod stage;
pub mod traits;
pub mod types;

pub use batch::*;
pub use builder::*;
pub use error::*;
pub use stage::*;
pub use traits::*;
pub use types::*;

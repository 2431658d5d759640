pub mod config;
pub mod logging;
pub mod error;
pub mod validation;
pub mod bom;
pub mod parts;

pub use self::config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;
pub use bom::*;
pub use parts::*;

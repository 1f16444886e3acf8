mod generator;
mod sleep;
mod tokio;

pub use self::tokio::*;
pub use generator::*;
pub use sleep::*;

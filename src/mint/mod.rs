pub mod builder;
pub mod process;

pub use builder::*;
pub use process::*;

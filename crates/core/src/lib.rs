pub mod config;
pub mod error;
pub mod register;
pub mod value;

pub use config::Config;
pub use error::*;
pub use register::{Reg, RegisterTable};
pub use value::Value;

pub mod command;
pub mod gateway;
pub mod invoker;
pub mod normalizer;

pub use crate::domain::model::{OwnershipTransfer, ProductDetails, ProductRegistration};
pub use crate::domain::ports::{CommandOutput, CommandRunner};
pub use crate::utils::error::Result;

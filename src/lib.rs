pub mod cert;
pub mod cli;
pub mod credentials;
pub mod error;
pub mod oss;
pub mod render;
pub mod validate;

pub type Result<T> = std::result::Result<T, error::AppError>;

pub mod api;
pub mod error;
pub mod health;
pub mod pages;
pub mod polls;
pub mod votes;

pub use error::AppError;

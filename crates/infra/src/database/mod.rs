//! SQLite storage adapters

pub mod manager;
pub mod meeting_repository;
pub mod session_repository;
pub mod user_repository;

pub use manager::*;
pub use meeting_repository::*;
pub use session_repository::*;
pub use user_repository::*;

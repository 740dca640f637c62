//! In-memory storage adapters
//!
//! Used for `storage_backend = "memory"` and for tests that do not need a
//! database file. Nothing survives the process.

pub mod meetings;
pub mod sessions;
pub mod users;

pub use meetings::MemoryMeetingRepository;
pub use sessions::MemorySessionRepository;
pub use users::MemoryUserRepository;

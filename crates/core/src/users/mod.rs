//! User registration and role management

pub mod ports;
pub mod registration;

pub use ports::UserRepository;
pub use registration::RegistrationService;

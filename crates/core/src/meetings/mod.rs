//! Meeting Store: durable meeting records and day queries

pub mod ports;
pub mod service;

pub use ports::MeetingRepository;
pub use service::MeetingService;

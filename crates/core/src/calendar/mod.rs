//! Calendar Index: day → presence marker projection

pub mod index;

pub use index::CalendarIndex;

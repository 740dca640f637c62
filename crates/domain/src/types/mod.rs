//! Domain types and models

pub mod calendar;
pub mod ids;
pub mod meeting;
pub mod role;
pub mod session;
pub mod user;

pub use calendar::{project_markers, CalendarMarkers, DayMarker};
pub use ids::{MeetingId, UserId};
pub use meeting::{AttendanceChange, Meeting, NewMeeting, ReservationState};
pub use role::{CallerContext, Identity, Role};
pub use session::{Session, SessionToken, SignIn};
pub use user::{NewUser, User};

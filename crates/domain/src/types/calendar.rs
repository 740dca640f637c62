//! Calendar presence markers
//!
//! Markers are a projection of the meeting set and never stored.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::meeting::Meeting;

/// Display hint for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMarker {
    pub has_meeting: bool,
    pub meeting_count: usize,
    pub dot_color: String,
}

/// Day → marker map, ordered by date
pub type CalendarMarkers = BTreeMap<NaiveDate, DayMarker>;

/// Group meetings by UTC day.
///
/// Days without meetings are absent rather than marked `has_meeting: false`.
#[must_use]
pub fn project_markers(meetings: &[Meeting], dot_color: &str) -> CalendarMarkers {
    let mut markers = CalendarMarkers::new();
    for meeting in meetings {
        markers
            .entry(meeting.day())
            .and_modify(|marker: &mut DayMarker| marker.meeting_count += 1)
            .or_insert_with(|| DayMarker {
                has_meeting: true,
                meeting_count: 1,
                dot_color: dot_color.to_string(),
            });
    }
    markers
}

//! iCalendar (RFC 5545) export for workshops.

use icalendar::{Calendar, Component, Event, EventLike, Property};

use crate::types::Timestamp;

const PRODID: &str = "-//Gurmania//Workshops//EN";

/// One event to render.
#[derive(Debug, Clone)]
pub struct CalendarEvent<'a> {
    /// Globally unique id, e.g. `workshop-12@gurmania`.
    pub uid: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    /// When the document was generated (`DTSTAMP`).
    pub generated_at: Timestamp,
}

impl CalendarEvent<'_> {
    fn to_ical(&self) -> Event {
        let mut event = Event::new();
        event
            .uid(self.uid)
            .summary(self.title)
            .starts(self.starts_at)
            .ends(self.ends_at)
            .timestamp(self.generated_at);
        if let Some(description) = self.description {
            event.description(description);
        }
        event.done()
    }
}

/// Render a single-event `VCALENDAR` document.
pub fn render_ics(event: &CalendarEvent<'_>) -> String {
    let mut calendar = Calendar::new();
    calendar.append_property(Property::new("PRODID", PRODID));
    calendar.push(event.to_ical());
    calendar.done().to_string()
}

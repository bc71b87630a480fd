use chrono::{DateTime, Utc};

use crate::orientation::Face;

/// Everything the device side can tell the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// Raw orientation code, anything outside 1-8 means no face is up.
    Orientation(i64),
    Battery(u8),
    Disconnected,
    TransportFailed(String),
    /// Changes the task and/or job attached to segments that close from now on.
    Annotate {
        task: Option<String>,
        job: Option<String>,
    },
}

/// An event together with the moment the transport observed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMessage {
    pub event: TrackerEvent,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningTimer {
    pub face: Face,
    pub label: String,
    pub started_at: DateTime<Utc>,
}

/// What observers of the tracker get to see. Published after every processed event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub running: Option<RunningTimer>,
    pub battery: Option<u8>,
    pub task: String,
    pub job: String,
}

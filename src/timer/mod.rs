//! Turns a stream of orientation codes into closed runs.
//!
//! A run starts when a face comes up and closes when the device goes idle, another face comes up
//! or the connection is lost. Repeated notifications for the active face are ignored, sensors
//! resend the same code near face edges.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::{
    labels::LabelRegistry,
    orientation::{Face, Orientation},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running {
        face: Face,
        started_at: DateTime<Utc>,
    },
}

impl TimerState {
    pub fn current_face(&self) -> Option<Face> {
        match self {
            TimerState::Idle => None,
            TimerState::Running { face, .. } => Some(*face),
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            TimerState::Idle => None,
            TimerState::Running { started_at, .. } => Some(*started_at),
        }
    }
}

/// A finished run. `label` is the name the face had when the run closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedRun {
    pub face: Face,
    pub label: String,
    pub started_at: DateTime<Utc>,
    /// Whole seconds, always positive.
    pub duration: Duration,
}

#[derive(Debug, Default)]
pub struct TimerMachine {
    state: TimerState,
}

impl TimerMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Applies one orientation notification. Returns the run that closed because of it, if any.
    /// Switching faces closes the previous run and starts the next one at the same moment.
    pub fn apply(
        &mut self,
        orientation: Orientation,
        now: DateTime<Utc>,
        labels: &LabelRegistry,
    ) -> Option<ClosedRun> {
        match (self.state, orientation) {
            (TimerState::Idle, Orientation::Idle) => None,
            (TimerState::Idle, Orientation::Face(face)) => {
                self.start(face, now, labels);
                None
            }
            (TimerState::Running { face: current, .. }, Orientation::Face(face))
                if current == face =>
            {
                debug!("Face {face} is already running");
                None
            }
            (TimerState::Running { .. }, Orientation::Idle) => self.close(now, labels),
            (TimerState::Running { .. }, Orientation::Face(face)) => {
                let closed = self.close(now, labels);
                self.start(face, now, labels);
                closed
            }
        }
    }

    /// Closes the running run as if the device went idle. Used on disconnects and transport
    /// failures so that a run is never lost.
    pub fn force_close(&mut self, now: DateTime<Utc>, labels: &LabelRegistry) -> Option<ClosedRun> {
        match self.state {
            TimerState::Idle => None,
            TimerState::Running { .. } => {
                info!("Forcing the running timer to stop");
                self.close(now, labels)
            }
        }
    }

    /// Time spent in the running run so far. Recomputed from the start every call.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.state
            .started_at()
            .map(|started_at| elapsed_between(started_at, now))
    }

    fn start(&mut self, face: Face, now: DateTime<Utc>, labels: &LabelRegistry) {
        info!("Started timer for {} (face {face})", labels.resolve(face).name);
        self.state = TimerState::Running {
            face,
            started_at: now,
        };
    }

    fn close(&mut self, now: DateTime<Utc>, labels: &LabelRegistry) -> Option<ClosedRun> {
        let TimerState::Running { face, started_at } = std::mem::take(&mut self.state) else {
            return None;
        };
        let label = labels.resolve(face).name;
        let duration = Duration::seconds((now - started_at).num_seconds());
        if duration <= Duration::zero() {
            warn!(
                "Dropping run of {label} with non-positive duration {}s (started {started_at}, closed {now})",
                duration.num_seconds()
            );
            return None;
        }
        info!("Stopped timer for {label} after {}s", duration.num_seconds());
        Some(ClosedRun {
            face,
            label,
            started_at,
            duration,
        })
    }
}

/// Non-negative, whole-second time between two moments.
pub fn elapsed_between(started_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    Duration::seconds((now - started_at).num_seconds().max(0))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use crate::{
        labels::LabelRegistry,
        orientation::{Face, Orientation},
    };

    use super::{ClosedRun, TimerMachine, TimerState};

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(), NaiveTime::MIN);

    fn start() -> DateTime<Utc> {
        Utc.from_utc_datetime(&TEST_START_DATE)
    }

    fn labels() -> LabelRegistry {
        let mut labels = LabelRegistry::new();
        labels.update(3, "Coding", "#00AA00").unwrap();
        labels.update(5, "Meetings", "#AA0000").unwrap();
        labels
    }

    /// Feeds `(minutes since start, code)` pairs and collects every closed run.
    fn feed(machine: &mut TimerMachine, events: &[(i64, i64)]) -> Vec<ClosedRun> {
        let labels = labels();
        events
            .iter()
            .filter_map(|(minute, code)| {
                machine.apply(
                    Orientation::from_code(*code),
                    start() + Duration::minutes(*minute),
                    &labels,
                )
            })
            .collect()
    }

    #[test]
    fn test_repeated_face_is_one_run() {
        let mut machine = TimerMachine::new();
        let runs = feed(&mut machine, &[(0, 3), (2, 3), (7, 3), (10, 0)]);

        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].label, "Coding");
        assert_eq!(runs[0].face, Face::new(3).unwrap());
        assert_eq!(runs[0].duration, Duration::minutes(10));
        assert_eq!(runs[0].started_at, start());
        assert_eq!(*machine.state(), TimerState::Idle);
    }

    #[test]
    fn test_switching_faces_is_atomic() {
        let mut machine = TimerMachine::new();
        let runs = feed(&mut machine, &[(0, 3), (2, 5), (5, 0)]);

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].label, "Coding");
        assert_eq!(runs[0].duration, Duration::minutes(2));
        assert_eq!(runs[1].label, "Meetings");
        assert_eq!(runs[1].duration, Duration::minutes(3));
        assert_eq!(runs[1].started_at, start() + Duration::minutes(2));
    }

    #[test]
    fn test_run_count_matches_changes() {
        let codes = [0, 1, 1, 2, 0, 0, 2, 9, 4, 4, 4, 6, 1, 0, 8];
        let events = codes
            .iter()
            .enumerate()
            .map(|(minute, code)| (minute as i64, *code))
            .collect::<Vec<_>>();
        let mut machine = TimerMachine::new();
        let mut runs = feed(&mut machine, &events);
        runs.extend(machine.force_close(start() + Duration::minutes(60), &labels()));

        // Maximal runs of valid codes: 1 | 2 | 2 | 4 | 6 | 1 | 8
        let faces = runs.iter().map(|r| r.face.code()).collect::<Vec<_>>();
        assert_eq!(faces, vec![1, 2, 2, 4, 6, 1, 8]);
        assert!(runs.iter().all(|r| r.duration > Duration::zero()));
    }

    #[test]
    fn test_idle_codes_while_idle_do_nothing() {
        let mut machine = TimerMachine::new();
        let runs = feed(&mut machine, &[(0, 0), (1, 12), (2, -1)]);

        assert!(runs.is_empty());
        assert_eq!(*machine.state(), TimerState::Idle);
        assert_eq!(machine.elapsed(start()), None);
    }

    #[test]
    fn test_zero_duration_runs_are_dropped() {
        let labels = labels();
        let mut machine = TimerMachine::new();
        let at = start();
        let face = |c| Orientation::Face(Face::new(c).unwrap());

        assert_eq!(machine.apply(face(3), at, &labels), None);
        assert_eq!(
            machine.apply(face(5), at + Duration::milliseconds(400), &labels),
            None
        );
        // The switch still happened.
        assert_eq!(machine.state().current_face(), Face::new(5));
        assert_eq!(
            machine.state().started_at(),
            Some(at + Duration::milliseconds(400))
        );
    }

    #[test]
    fn test_clock_going_backwards_is_dropped() {
        let labels = labels();
        let mut machine = TimerMachine::new();
        machine.apply(Orientation::from_code(3), start(), &labels);

        let closed = machine.apply(
            Orientation::Idle,
            start() - Duration::minutes(1),
            &labels,
        );
        assert_eq!(closed, None);
        assert_eq!(*machine.state(), TimerState::Idle);
    }

    #[test]
    fn test_force_close() {
        let labels = labels();
        let mut machine = TimerMachine::new();
        assert_eq!(machine.force_close(start(), &labels), None);

        machine.apply(Orientation::from_code(5), start(), &labels);
        let closed = machine
            .force_close(start() + Duration::seconds(90), &labels)
            .unwrap();

        assert_eq!(closed.label, "Meetings");
        assert_eq!(closed.duration, Duration::seconds(90));
        assert_eq!(*machine.state(), TimerState::Idle);
    }

    #[test]
    fn test_label_is_resolved_when_run_closes() {
        let mut labels = labels();
        let mut machine = TimerMachine::new();
        machine.apply(Orientation::from_code(3), start(), &labels);
        labels.update(3, "Reviews", "#0000AA").unwrap();

        let closed = machine
            .apply(Orientation::Idle, start() + Duration::minutes(1), &labels)
            .unwrap();
        assert_eq!(closed.label, "Reviews");
    }

    #[test]
    fn test_elapsed_is_recomputed() {
        let labels = labels();
        let mut machine = TimerMachine::new();
        machine.apply(Orientation::from_code(3), start(), &labels);

        assert_eq!(
            machine.elapsed(start() + Duration::milliseconds(2_500)),
            Some(Duration::seconds(2))
        );
        assert_eq!(
            machine.elapsed(start() + Duration::minutes(4)),
            Some(Duration::minutes(4))
        );
        assert_eq!(machine.elapsed(start() - Duration::minutes(4)), Some(Duration::zero()));
    }
}

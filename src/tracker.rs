//! Segment tracking state machine
//!
//! [`SegmentTracker`] owns the progress through one workout. Each call to
//! [`SegmentTracker::update_progress`] feeds the cumulative session distance;
//! transitions are driven by distance only, never by speed or elapsed time.
//!
//! Interval workouts walk `(1, Work) → (1, Recovery) → (2, Work) → … → Completed`.
//! Combination workouts walk segment indices `0 → 1 → … → N-1 → Completed`.
//! Both are strictly forward, and reaching a target distance exactly counts as
//! finishing it.

use crate::config::TrackerConfig;
use crate::definition::WorkoutDefinition;
use crate::error::TrackerError;
use crate::types::{HeartRateRange, Pace, PaceStatus, Phase, Segment, TrackerSnapshot, TrackingMode};
use serde::{Deserialize, Serialize};

/// Progress through an interval workout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalProgress {
    /// 1-based lap number
    pub lap: u32,
    pub phase: Phase,
    /// Meters covered since the current phase started
    pub distance_in_phase: f64,
}

impl IntervalProgress {
    pub fn start() -> Self {
        Self {
            lap: 1,
            phase: Phase::Work,
            distance_in_phase: 0.0,
        }
    }
}

/// Progress through a combination workout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinationProgress {
    /// 0-based segment index
    pub segment_index: usize,
    /// Meters covered since the current segment started
    pub distance_in_segment: f64,
}

impl CombinationProgress {
    pub fn start() -> Self {
        Self {
            segment_index: 0,
            distance_in_segment: 0.0,
        }
    }
}

/// Mode-specific progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Progress {
    Interval(IntervalProgress),
    Combination(CombinationProgress),
}

impl Progress {
    pub fn mode(&self) -> TrackingMode {
        match self {
            Progress::Interval(_) => TrackingMode::Interval,
            Progress::Combination(_) => TrackingMode::Combination,
        }
    }
}

/// Full tracker state, used to checkpoint and resume a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    pub progress: Progress,
    /// Meters covered over the whole session
    pub total_distance: f64,
    pub completed: bool,
}

/// Transition produced by a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackerEvent {
    /// An interval phase started
    PhaseStarted { lap: u32, phase: Phase },
    /// A combination segment started
    SegmentStarted { index: usize },
    /// The final phase or segment was finished
    Completed,
}

/// Definition and progress kept together so each mode only sees its own state
#[derive(Debug, Clone)]
enum Course {
    Interval {
        work: Segment,
        recovery: Segment,
        repeats: u32,
        progress: IntervalProgress,
    },
    Combination {
        segments: Vec<Segment>,
        progress: CombinationProgress,
    },
}

/// Real-time tracker for one workout session.
///
/// Not internally synchronized; see [`SharedTracker`](crate::shared::SharedTracker)
/// when the sample source and the reader run on different threads.
#[derive(Debug, Clone)]
pub struct SegmentTracker {
    course: Course,
    total_distance: f64,
    completed: bool,
    current_speed: f64,
    workout_distance: f64,
    config: TrackerConfig,
}

impl SegmentTracker {
    /// Create a tracker in its initial state.
    ///
    /// Fails with [`TrackerError::ModeMismatch`] when `mode` does not match the
    /// definition's shape, and with [`TrackerError::InvalidDefinition`] when the
    /// definition breaks its invariants.
    pub fn new(definition: WorkoutDefinition, mode: TrackingMode) -> Result<Self, TrackerError> {
        Self::with_config(definition, mode, TrackerConfig::default())
    }

    /// Create a tracker using the definition's own mode
    pub fn from_definition(definition: WorkoutDefinition) -> Result<Self, TrackerError> {
        let mode = definition.mode();
        Self::new(definition, mode)
    }

    /// Create a tracker with custom configuration
    pub fn with_config(
        definition: WorkoutDefinition,
        mode: TrackingMode,
        config: TrackerConfig,
    ) -> Result<Self, TrackerError> {
        definition.validate()?;
        if definition.mode() != mode {
            return Err(TrackerError::ModeMismatch {
                expected: mode,
                found: definition.mode(),
            });
        }

        let workout_distance = definition.total_distance_meters();
        let course = match definition {
            WorkoutDefinition::Interval {
                work,
                recovery,
                repeats,
            } => Course::Interval {
                work,
                recovery,
                repeats,
                progress: IntervalProgress::start(),
            },
            WorkoutDefinition::Combination { segments } => Course::Combination {
                segments,
                progress: CombinationProgress::start(),
            },
        };

        log::info!("Tracking {} workout over {:.0} m", mode, workout_distance);

        Ok(Self {
            course,
            total_distance: 0.0,
            completed: false,
            current_speed: 0.0,
            workout_distance,
            config,
        })
    }

    /// Rebuild a tracker at an arbitrary state.
    ///
    /// Used to restore a checkpointed session. An interval state whose lap is
    /// past the repeat count resumes as completed.
    pub fn resume(
        definition: WorkoutDefinition,
        state: TrackerState,
    ) -> Result<Self, TrackerError> {
        Self::resume_with_config(definition, state, TrackerConfig::default())
    }

    /// Rebuild a tracker at an arbitrary state with custom configuration
    pub fn resume_with_config(
        definition: WorkoutDefinition,
        state: TrackerState,
        config: TrackerConfig,
    ) -> Result<Self, TrackerError> {
        let mode = state.progress.mode();
        let mut tracker = Self::with_config(definition, mode, config)?;
        let found = tracker.mode();

        if !state.total_distance.is_finite() || state.total_distance < 0.0 {
            return Err(TrackerError::InvalidState(format!(
                "total distance must be a non-negative number, got {}",
                state.total_distance
            )));
        }

        match (&mut tracker.course, state.progress) {
            (Course::Interval { repeats, progress, .. }, Progress::Interval(resumed)) => {
                if resumed.lap < 1 {
                    return Err(TrackerError::InvalidState("lap is 1-based".to_string()));
                }
                check_local_distance(resumed.distance_in_phase)?;
                *progress = resumed;
                tracker.completed = state.completed || resumed.lap > *repeats;
            }
            (Course::Combination { segments, progress }, Progress::Combination(resumed)) => {
                if resumed.segment_index >= segments.len() {
                    return Err(TrackerError::InvalidState(format!(
                        "segment index {} out of range for {} segments",
                        resumed.segment_index,
                        segments.len()
                    )));
                }
                check_local_distance(resumed.distance_in_segment)?;
                *progress = resumed;
                tracker.completed = state.completed;
            }
            // `new` already rejected a shape mismatch
            _ => {
                return Err(TrackerError::ModeMismatch {
                    expected: mode,
                    found,
                })
            }
        }

        tracker.total_distance = state.total_distance;
        // Settle a local counter that was checkpointed past its target
        tracker.advance();
        Ok(tracker)
    }

    /// Feed one sample.
    ///
    /// `current_distance` is the cumulative session distance in meters;
    /// `current_speed` is the instantaneous speed in m/s and only feeds pace
    /// comparison. Backward or non-finite distances are clamped to no progress.
    /// Returns the transitions this sample caused, in order.
    pub fn update_progress(
        &mut self,
        current_distance: f64,
        current_speed: f64,
    ) -> Vec<TrackerEvent> {
        self.current_speed = if current_speed.is_finite() && current_speed > 0.0 {
            current_speed
        } else {
            0.0
        };

        let delta = current_distance - self.total_distance;
        let delta = if delta.is_finite() && delta > 0.0 {
            delta
        } else {
            if delta != 0.0 {
                log::trace!(
                    "Clamping sample {} m below covered distance {} m",
                    current_distance,
                    self.total_distance
                );
            }
            0.0
        };

        self.total_distance += delta;

        if self.completed {
            return Vec::new();
        }

        match &mut self.course {
            Course::Interval { progress, .. } => progress.distance_in_phase += delta,
            Course::Combination { progress, .. } => progress.distance_in_segment += delta,
        }

        self.advance()
    }

    /// Apply every transition the local counter has earned
    fn advance(&mut self) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        if self.completed {
            return events;
        }

        match &mut self.course {
            Course::Interval {
                work,
                recovery,
                repeats,
                progress,
            } => loop {
                let target = match progress.phase {
                    Phase::Work => work.target_distance_meters(),
                    Phase::Recovery => recovery.target_distance_meters(),
                };
                if progress.distance_in_phase < target {
                    break;
                }
                progress.distance_in_phase -= target;

                match progress.phase {
                    Phase::Work => progress.phase = Phase::Recovery,
                    Phase::Recovery => {
                        progress.lap = progress.lap.saturating_add(1);
                        progress.phase = Phase::Work;
                    }
                }

                if progress.lap > *repeats {
                    self.completed = true;
                    events.push(TrackerEvent::Completed);
                    break;
                }

                log::debug!("Lap {} {} started", progress.lap, progress.phase.as_str());
                events.push(TrackerEvent::PhaseStarted {
                    lap: progress.lap,
                    phase: progress.phase,
                });
            },
            Course::Combination { segments, progress } => loop {
                let target = segments[progress.segment_index].target_distance_meters();
                if progress.distance_in_segment < target {
                    break;
                }

                if progress.segment_index + 1 == segments.len() {
                    self.completed = true;
                    events.push(TrackerEvent::Completed);
                    break;
                }

                progress.distance_in_segment -= target;
                progress.segment_index += 1;

                log::debug!("Segment {} started", progress.segment_index);
                events.push(TrackerEvent::SegmentStarted {
                    index: progress.segment_index,
                });
            },
        }

        if self.completed {
            log::info!("Workout completed at {:.0} m", self.total_distance);
        }

        events
    }

    pub fn mode(&self) -> TrackingMode {
        match self.course {
            Course::Interval { .. } => TrackingMode::Interval,
            Course::Combination { .. } => TrackingMode::Combination,
        }
    }

    /// The segment currently being run
    pub fn current_segment(&self) -> &Segment {
        match &self.course {
            Course::Interval {
                work,
                recovery,
                progress,
                ..
            } => match progress.phase {
                Phase::Work => work,
                Phase::Recovery => recovery,
            },
            Course::Combination { segments, progress } => &segments[progress.segment_index],
        }
    }

    /// Target distance of the active segment in meters
    pub fn current_segment_distance(&self) -> f64 {
        self.current_segment().target_distance_meters()
    }

    /// Target pace of the active segment, displayed as `m:ss`
    pub fn current_target_pace(&self) -> Option<Pace> {
        self.current_segment().target_pace()
    }

    pub fn current_target_heart_rate(&self) -> Option<HeartRateRange> {
        self.current_segment().target_heart_rate()
    }

    /// Meters covered within the active segment
    pub fn distance_in_current_segment(&self) -> f64 {
        match &self.course {
            Course::Interval { progress, .. } => progress.distance_in_phase,
            Course::Combination { progress, .. } => progress.distance_in_segment,
        }
    }

    /// Meters left in the active segment, floored at 0 and 0 once completed.
    ///
    /// Accumulated floating-point drift of about a meter over long sessions is
    /// expected.
    pub fn remaining_distance(&self) -> f64 {
        if self.completed {
            return 0.0;
        }
        (self.current_segment_distance() - self.distance_in_current_segment()).max(0.0)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// 1-based lap, interval workouts only
    pub fn current_lap(&self) -> Option<u32> {
        match &self.course {
            Course::Interval { progress, .. } => Some(progress.lap),
            Course::Combination { .. } => None,
        }
    }

    /// Work or recovery, interval workouts only
    pub fn current_phase(&self) -> Option<Phase> {
        match &self.course {
            Course::Interval { progress, .. } => Some(progress.phase),
            Course::Combination { .. } => None,
        }
    }

    /// 0-based segment index, combination workouts only
    pub fn current_segment_index(&self) -> Option<usize> {
        match &self.course {
            Course::Interval { .. } => None,
            Course::Combination { progress, .. } => Some(progress.segment_index),
        }
    }

    pub fn repeats(&self) -> Option<u32> {
        match &self.course {
            Course::Interval { repeats, .. } => Some(*repeats),
            Course::Combination { .. } => None,
        }
    }

    pub fn segment_count(&self) -> usize {
        match &self.course {
            Course::Interval { .. } => 2,
            Course::Combination { segments, .. } => segments.len(),
        }
    }

    /// Meters covered over the whole session
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Planned distance of the whole workout
    pub fn workout_distance(&self) -> f64 {
        self.workout_distance
    }

    /// Speed from the last sample (m/s)
    pub fn current_speed(&self) -> f64 {
        self.current_speed
    }

    /// Live pace in seconds per km, `None` while standing still
    pub fn current_pace(&self) -> Option<f64> {
        if self.current_speed > 0.0 {
            Some(1000.0 / self.current_speed)
        } else {
            None
        }
    }

    /// Live pace against the active target pace
    pub fn pace_status(&self) -> Option<PaceStatus> {
        if self.completed {
            return None;
        }
        let target = self.current_target_pace()?.as_secs_f64();
        let pace = self.current_pace()?;
        let tolerance = self.config.pace_tolerance_secs;

        if pace < target - tolerance {
            Some(PaceStatus::Ahead)
        } else if pace > target + tolerance {
            Some(PaceStatus::Behind)
        } else {
            Some(PaceStatus::OnTarget)
        }
    }

    /// Fraction of the active segment covered (0-1)
    pub fn segment_progress(&self) -> f64 {
        if self.completed {
            return 1.0;
        }
        (self.distance_in_current_segment() / self.current_segment_distance()).clamp(0.0, 1.0)
    }

    /// Fraction of the whole workout covered (0-1)
    pub fn overall_progress(&self) -> f64 {
        if self.completed {
            return 1.0;
        }
        (self.total_distance / self.workout_distance).clamp(0.0, 1.0)
    }

    /// Current state, suitable for [`SegmentTracker::resume`]
    pub fn state(&self) -> TrackerState {
        let progress = match &self.course {
            Course::Interval { progress, .. } => Progress::Interval(*progress),
            Course::Combination { progress, .. } => Progress::Combination(*progress),
        };
        TrackerState {
            progress,
            total_distance: self.total_distance,
            completed: self.completed,
        }
    }

    /// Every derived value in one struct
    pub fn snapshot(&self) -> TrackerSnapshot {
        let segment = self.current_segment();

        TrackerSnapshot {
            mode: self.mode(),
            lap: self.current_lap(),
            repeats: self.repeats(),
            phase: self.current_phase(),
            segment_index: self.current_segment_index(),
            segment_count: self.segment_count(),
            segment_description: segment.description().to_string(),
            segment_distance_m: segment.target_distance_meters(),
            target_pace: segment.target_pace(),
            target_heart_rate: segment.target_heart_rate(),
            distance_in_segment_m: self.distance_in_current_segment(),
            remaining_distance_m: self.remaining_distance(),
            total_distance_m: self.total_distance,
            workout_distance_m: self.workout_distance,
            segment_progress: self.segment_progress(),
            overall_progress: self.overall_progress(),
            current_speed_mps: self.current_speed,
            current_pace_secs_per_km: self.current_pace(),
            pace_status: self.pace_status(),
            completed: self.completed,
        }
    }
}

fn check_local_distance(distance: f64) -> Result<(), TrackerError> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(TrackerError::InvalidState(format!(
            "segment distance covered must be a non-negative number, got {distance}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::MAX_REPEATS;
    use pretty_assertions::assert_eq;

    fn segment(distance: f64, pace: &str, description: &str) -> Segment {
        Segment::with_pace(distance, pace.parse().unwrap(), description).unwrap()
    }

    fn six_by_thousand() -> WorkoutDefinition {
        WorkoutDefinition::interval(
            segment(1000.0, "4:00", "1000 m repeat"),
            segment(400.0, "6:00", "400 m jog"),
            6,
        )
        .unwrap()
    }

    fn two_by_thousand() -> WorkoutDefinition {
        WorkoutDefinition::interval(
            segment(1000.0, "4:00", "1000 m repeat"),
            segment(400.0, "6:00", "400 m jog"),
            2,
        )
        .unwrap()
    }

    fn tempo_combination() -> WorkoutDefinition {
        WorkoutDefinition::combination(vec![
            segment(2000.0, "6:00", "warm-up"),
            segment(5000.0, "4:30", "tempo"),
            segment(1000.0, "3:50", "sprint"),
            segment(2000.0, "6:30", "cool-down"),
        ])
        .unwrap()
    }

    #[test]
    fn test_interval_initial_state() {
        let tracker = SegmentTracker::new(six_by_thousand(), TrackingMode::Interval).unwrap();

        assert_eq!(tracker.current_lap(), Some(1));
        assert_eq!(tracker.current_phase(), Some(Phase::Work));
        assert_eq!(tracker.current_segment_index(), None);
        assert_eq!(tracker.current_segment_distance(), 1000.0);
        assert_eq!(tracker.current_target_pace().unwrap().to_string(), "4:00");
        assert!(!tracker.is_completed());
    }

    #[test]
    fn test_interval_partial_progress() {
        let mut tracker = SegmentTracker::new(six_by_thousand(), TrackingMode::Interval).unwrap();

        let events = tracker.update_progress(500.0, 3.33);

        assert!(events.is_empty());
        assert!((tracker.remaining_distance() - 500.0).abs() < 1.0);
        assert_eq!(tracker.current_lap(), Some(1));
        assert_eq!(tracker.current_phase(), Some(Phase::Work));
    }

    #[test]
    fn test_interval_exact_boundary_transitions() {
        let mut tracker = SegmentTracker::from_definition(six_by_thousand()).unwrap();

        let events = tracker.update_progress(1000.0, 4.0);

        assert_eq!(
            events,
            vec![TrackerEvent::PhaseStarted {
                lap: 1,
                phase: Phase::Recovery
            }]
        );
        assert_eq!(tracker.current_phase(), Some(Phase::Recovery));
        assert_eq!(tracker.distance_in_current_segment(), 0.0);
        assert_eq!(tracker.current_segment_distance(), 400.0);
        assert_eq!(tracker.current_target_pace().unwrap().to_string(), "6:00");

        let events = tracker.update_progress(1400.0, 2.8);
        assert_eq!(
            events,
            vec![TrackerEvent::PhaseStarted {
                lap: 2,
                phase: Phase::Work
            }]
        );
        assert_eq!(tracker.current_lap(), Some(2));
    }

    #[test]
    fn test_interval_large_sample_skips_phases() {
        let mut tracker = SegmentTracker::from_definition(six_by_thousand()).unwrap();

        let events = tracker.update_progress(2500.0, 4.0);

        assert_eq!(
            events,
            vec![
                TrackerEvent::PhaseStarted {
                    lap: 1,
                    phase: Phase::Recovery
                },
                TrackerEvent::PhaseStarted {
                    lap: 2,
                    phase: Phase::Work
                },
                TrackerEvent::PhaseStarted {
                    lap: 2,
                    phase: Phase::Recovery
                },
            ]
        );
        assert_eq!(tracker.current_lap(), Some(2));
        assert_eq!(tracker.current_phase(), Some(Phase::Recovery));
        assert_eq!(tracker.distance_in_current_segment(), 100.0);
        assert_eq!(tracker.remaining_distance(), 300.0);
    }

    #[test]
    fn test_interval_completion_is_terminal() {
        let mut tracker = SegmentTracker::from_definition(two_by_thousand()).unwrap();

        tracker.update_progress(1000.0, 4.0);
        tracker.update_progress(1400.0, 3.0);
        tracker.update_progress(2400.0, 4.0);
        assert!(!tracker.is_completed());

        let events = tracker.update_progress(2800.0, 3.0);
        assert_eq!(events, vec![TrackerEvent::Completed]);
        assert!(tracker.is_completed());
        assert_eq!(tracker.current_lap(), Some(3));
        assert_eq!(tracker.remaining_distance(), 0.0);

        // Backward jump after completion
        assert!(tracker.update_progress(2000.0, 3.0).is_empty());
        assert!(tracker.is_completed());
        assert_eq!(tracker.total_distance(), 2800.0);

        // Extra distance is counted but changes nothing else
        assert!(tracker.update_progress(5000.0, 3.0).is_empty());
        assert!(tracker.is_completed());
        assert_eq!(tracker.total_distance(), 5000.0);
        assert_eq!(tracker.current_lap(), Some(3));
    }

    #[test]
    fn test_single_sample_finishes_whole_interval_workout() {
        let mut tracker = SegmentTracker::from_definition(two_by_thousand()).unwrap();

        let events = tracker.update_progress(10_000.0, 4.0);

        assert_eq!(events.last(), Some(&TrackerEvent::Completed));
        assert_eq!(events.len(), 4);
        assert!(tracker.is_completed());
    }

    #[test]
    fn test_backward_sample_is_clamped() {
        let mut tracker = SegmentTracker::from_definition(six_by_thousand()).unwrap();

        tracker.update_progress(500.0, 3.0);
        let events = tracker.update_progress(450.0, 3.0);

        assert!(events.is_empty());
        assert_eq!(tracker.total_distance(), 500.0);
        assert_eq!(tracker.remaining_distance(), 500.0);

        tracker.update_progress(f64::NAN, 3.0);
        tracker.update_progress(f64::INFINITY, f64::NAN);
        assert_eq!(tracker.total_distance(), 500.0);
        assert_eq!(tracker.current_speed(), 0.0);
    }

    #[test]
    fn test_monotonic_under_jitter() {
        let mut tracker = SegmentTracker::from_definition(six_by_thousand()).unwrap();
        let mut last_total = 0.0;
        let mut last_lap = 1;
        let mut seen_completed = false;

        for i in 0..4000u32 {
            // Forward drift of ~3 m/s with occasional backward GPS jumps
            let jitter = ((i * 37) % 11) as f64 * 4.0 - 20.0;
            let distance = (i as f64 * 3.1 + jitter).max(0.0);
            tracker.update_progress(distance, 3.1);

            assert!(tracker.total_distance() >= last_total);
            let lap = tracker.current_lap().unwrap();
            assert!(lap >= last_lap);
            if seen_completed {
                assert!(tracker.is_completed());
            }

            last_total = tracker.total_distance();
            last_lap = lap;
            seen_completed = tracker.is_completed();
        }

        assert!(seen_completed);
        assert_eq!(tracker.current_lap(), Some(7));
    }

    #[test]
    fn test_combination_monotonic_under_jitter() {
        let mut tracker = SegmentTracker::from_definition(tempo_combination()).unwrap();
        let mut last_total = 0.0;
        let mut last_index = 0;

        for i in 0..4000u32 {
            let jitter = ((i * 53) % 13) as f64 * 5.0 - 30.0;
            let distance = (i as f64 * 3.1 + jitter).max(0.0);
            tracker.update_progress(distance, 3.1);

            assert!(tracker.total_distance() >= last_total);
            let index = tracker.current_segment_index().unwrap();
            assert!(index >= last_index);

            last_total = tracker.total_distance();
            last_index = index;
        }

        assert!(tracker.is_completed());
        assert_eq!(tracker.current_segment_index(), Some(3));

        // A wild backward jump after completion changes nothing
        tracker.update_progress(10.0, 3.1);
        assert!(tracker.is_completed());
        assert_eq!(tracker.total_distance(), last_total);
    }

    #[test]
    fn test_combination_initial_state() {
        let tracker =
            SegmentTracker::new(tempo_combination(), TrackingMode::Combination).unwrap();

        assert_eq!(tracker.current_segment_index(), Some(0));
        assert_eq!(tracker.current_lap(), None);
        assert_eq!(tracker.current_phase(), None);
        assert_eq!(tracker.current_segment_distance(), 2000.0);
        assert_eq!(tracker.current_target_pace().unwrap().to_string(), "6:00");
        assert!(!tracker.is_completed());
    }

    #[test]
    fn test_combination_progression() {
        let mut tracker = SegmentTracker::from_definition(tempo_combination()).unwrap();

        assert!(tracker.update_progress(1999.0, 2.8).is_empty());
        assert_eq!(tracker.current_segment_index(), Some(0));

        let events = tracker.update_progress(2000.0, 2.8);
        assert_eq!(events, vec![TrackerEvent::SegmentStarted { index: 1 }]);
        assert_eq!(tracker.current_segment().description(), "tempo");
        assert_eq!(tracker.current_target_pace().unwrap().to_string(), "4:30");
        assert_eq!(tracker.remaining_distance(), 5000.0);

        let events = tracker.update_progress(10_000.0, 3.7);
        assert_eq!(
            events,
            vec![
                TrackerEvent::SegmentStarted { index: 2 },
                TrackerEvent::SegmentStarted { index: 3 },
                TrackerEvent::Completed,
            ]
        );
        assert!(tracker.is_completed());
        assert_eq!(tracker.current_segment_index(), Some(3));
        assert_eq!(tracker.remaining_distance(), 0.0);

        assert!(tracker.update_progress(12_000.0, 3.0).is_empty());
        assert_eq!(tracker.current_segment_index(), Some(3));
        assert_eq!(tracker.total_distance(), 12_000.0);
    }

    #[test]
    fn test_single_segment_combination() {
        let definition =
            WorkoutDefinition::combination(vec![segment(5000.0, "5:00", "steady")]).unwrap();
        let mut tracker = SegmentTracker::from_definition(definition).unwrap();

        tracker.update_progress(4999.5, 3.3);
        assert!(!tracker.is_completed());

        assert_eq!(tracker.update_progress(5000.0, 3.3), vec![TrackerEvent::Completed]);
        assert!(tracker.is_completed());
    }

    #[test]
    fn test_mode_mismatch() {
        let result = SegmentTracker::new(six_by_thousand(), TrackingMode::Combination);
        assert!(matches!(
            result,
            Err(TrackerError::ModeMismatch {
                expected: TrackingMode::Combination,
                found: TrackingMode::Interval
            })
        ));

        let result = SegmentTracker::new(tempo_combination(), TrackingMode::Interval);
        assert!(matches!(result, Err(TrackerError::ModeMismatch { .. })));
    }

    #[test]
    fn test_invalid_hand_built_definition() {
        let definition = WorkoutDefinition::Interval {
            work: segment(1000.0, "4:00", "work"),
            recovery: segment(400.0, "6:00", "jog"),
            repeats: 0,
        };
        let result = SegmentTracker::from_definition(definition);
        assert!(matches!(result, Err(TrackerError::InvalidDefinition(_))));

        let result = SegmentTracker::from_definition(WorkoutDefinition::Combination {
            segments: vec![],
        });
        assert!(matches!(result, Err(TrackerError::InvalidDefinition(_))));
    }

    #[test]
    fn test_resume_past_last_lap_is_completed() {
        let state = TrackerState {
            progress: Progress::Interval(IntervalProgress {
                lap: 7,
                phase: Phase::Work,
                distance_in_phase: 0.0,
            }),
            total_distance: 8400.0,
            completed: false,
        };

        let tracker = SegmentTracker::resume(six_by_thousand(), state).unwrap();

        assert!(tracker.is_completed());
        assert_eq!(tracker.current_lap(), Some(7));
    }

    #[test]
    fn test_resume_at_max_lap_does_not_overflow() {
        let state = TrackerState {
            progress: Progress::Interval(IntervalProgress {
                lap: u32::MAX,
                phase: Phase::Recovery,
                distance_in_phase: 0.0,
            }),
            total_distance: 0.0,
            completed: false,
        };

        let mut tracker = SegmentTracker::resume(six_by_thousand(), state).unwrap();
        assert!(tracker.is_completed());
        assert!(tracker.update_progress(500.0, 3.0).is_empty());
        assert_eq!(tracker.current_lap(), Some(u32::MAX));
    }

    #[test]
    fn test_longest_interval_workout_completes() {
        let longest = || {
            WorkoutDefinition::interval(
                segment(1000.0, "4:00", "1000 m repeat"),
                segment(400.0, "6:00", "400 m jog"),
                MAX_REPEATS,
            )
            .unwrap()
        };

        let state = TrackerState {
            progress: Progress::Interval(IntervalProgress {
                lap: MAX_REPEATS,
                phase: Phase::Recovery,
                distance_in_phase: 0.0,
            }),
            total_distance: 0.0,
            completed: false,
        };
        let mut resumed = SegmentTracker::resume(longest(), state).unwrap();
        assert_eq!(
            resumed.update_progress(500.0, 3.0),
            vec![TrackerEvent::Completed]
        );
        assert_eq!(resumed.current_lap(), Some(MAX_REPEATS + 1));

        let mut fresh = SegmentTracker::from_definition(longest()).unwrap();
        let events = fresh.update_progress(1_400_000.0, 3.0);
        assert_eq!(events.len(), 2 * MAX_REPEATS as usize);
        assert_eq!(events.last(), Some(&TrackerEvent::Completed));
    }

    #[test]
    fn test_resume_rejects_impossible_states() {
        let lap_zero = TrackerState {
            progress: Progress::Interval(IntervalProgress {
                lap: 0,
                phase: Phase::Work,
                distance_in_phase: 0.0,
            }),
            total_distance: 0.0,
            completed: false,
        };
        assert!(matches!(
            SegmentTracker::resume(six_by_thousand(), lap_zero),
            Err(TrackerError::InvalidState(_))
        ));

        let out_of_range = TrackerState {
            progress: Progress::Combination(CombinationProgress {
                segment_index: 4,
                distance_in_segment: 0.0,
            }),
            total_distance: 0.0,
            completed: false,
        };
        assert!(matches!(
            SegmentTracker::resume(tempo_combination(), out_of_range),
            Err(TrackerError::InvalidState(_))
        ));

        let wrong_shape = TrackerState {
            progress: Progress::Combination(CombinationProgress::start()),
            total_distance: 0.0,
            completed: false,
        };
        assert!(matches!(
            SegmentTracker::resume(six_by_thousand(), wrong_shape),
            Err(TrackerError::ModeMismatch { .. })
        ));
    }

    #[test]
    fn test_state_checkpoint_round_trip() {
        let mut tracker = SegmentTracker::from_definition(tempo_combination()).unwrap();
        tracker.update_progress(3200.0, 3.5);

        let json = serde_json::to_string(&tracker.state()).unwrap();
        let state: TrackerState = serde_json::from_str(&json).unwrap();
        let mut resumed = SegmentTracker::resume(tempo_combination(), state).unwrap();

        assert_eq!(resumed.current_segment_index(), Some(1));
        assert_eq!(resumed.distance_in_current_segment(), 1200.0);
        assert_eq!(resumed.total_distance(), 3200.0);

        assert_eq!(
            resumed.update_progress(7000.0, 3.5),
            vec![TrackerEvent::SegmentStarted { index: 2 }]
        );
    }

    #[test]
    fn test_queries_are_idempotent() {
        let mut tracker = SegmentTracker::from_definition(six_by_thousand()).unwrap();
        tracker.update_progress(1234.0, 3.9);

        let first = tracker.snapshot();
        let second = tracker.snapshot();
        assert_eq!(first, second);
        assert_eq!(tracker.remaining_distance(), tracker.remaining_distance());
        assert_eq!(tracker.state(), tracker.state());
    }

    #[test]
    fn test_pace_status() {
        let mut tracker = SegmentTracker::from_definition(six_by_thousand()).unwrap();
        assert_eq!(tracker.pace_status(), None);

        // 4:00 per km is 1000 / 240 m/s
        tracker.update_progress(100.0, 1000.0 / 240.0);
        assert_eq!(tracker.pace_status(), Some(PaceStatus::OnTarget));

        tracker.update_progress(200.0, 5.0);
        assert_eq!(tracker.pace_status(), Some(PaceStatus::Ahead));

        tracker.update_progress(300.0, 3.33);
        assert_eq!(tracker.pace_status(), Some(PaceStatus::Behind));

        tracker.update_progress(400.0, 0.0);
        assert_eq!(tracker.current_pace(), None);
        assert_eq!(tracker.pace_status(), None);
    }

    #[test]
    fn test_pace_tolerance_from_config() {
        let mut tracker = SegmentTracker::with_config(
            six_by_thousand(),
            TrackingMode::Interval,
            TrackerConfig::with_pace_tolerance(30.0),
        )
        .unwrap();

        // 250 s/km against a 240 s/km target
        tracker.update_progress(100.0, 4.0);
        assert_eq!(tracker.pace_status(), Some(PaceStatus::OnTarget));
    }

    #[test]
    fn test_progress_fractions() {
        let mut tracker = SegmentTracker::from_definition(two_by_thousand()).unwrap();
        assert_eq!(tracker.workout_distance(), 2800.0);

        tracker.update_progress(700.0, 3.0);
        assert_eq!(tracker.segment_progress(), 0.7);
        assert_eq!(tracker.overall_progress(), 0.25);

        tracker.update_progress(2800.0, 3.0);
        assert_eq!(tracker.segment_progress(), 1.0);
        assert_eq!(tracker.overall_progress(), 1.0);
    }

    #[test]
    fn test_snapshot_contents() {
        let mut tracker = SegmentTracker::from_definition(tempo_combination()).unwrap();
        tracker.update_progress(2500.0, 3.7);

        let snapshot = tracker.snapshot();

        assert_eq!(snapshot.mode, TrackingMode::Combination);
        assert_eq!(snapshot.segment_index, Some(1));
        assert_eq!(snapshot.segment_count, 4);
        assert_eq!(snapshot.segment_description, "tempo");
        assert_eq!(snapshot.segment_distance_m, 5000.0);
        assert_eq!(snapshot.distance_in_segment_m, 500.0);
        assert_eq!(snapshot.remaining_distance_m, 4500.0);
        assert_eq!(snapshot.workout_distance_m, 10_000.0);
        assert_eq!(snapshot.lap, None);
        assert!(!snapshot.completed);
    }

    #[test]
    fn test_event_serialization() {
        let event = TrackerEvent::PhaseStarted {
            lap: 2,
            phase: Phase::Recovery,
        };
        let value = serde_json::to_value(event).unwrap();

        assert_eq!(value["type"], "phase_started");
        assert_eq!(value["lap"], 2);
        assert_eq!(value["phase"], "recovery");
    }
}

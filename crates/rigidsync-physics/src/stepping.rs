//! Fixed-substep stepping policy, frame timing and step profiling.

use std::time::{Duration, Instant};

/// Splits variable frame times into fixed solver steps.
///
/// Unsimulated time carries over between calls. At most `max_substeps`
/// steps run per call and any time beyond that is dropped, so a stalled
/// frame never snowballs into ever larger catch-up work.
#[derive(Debug, Clone)]
pub struct FixedStepper {
    fixed_time_step: f64,
    max_substeps: u32,
    accumulator: f64,
}

/// Steps to run for one `step_physics` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPlan {
    /// Number of solver steps.
    pub steps: u32,
    /// Duration of each step (seconds).
    pub step_size: f64,
}

impl StepPlan {
    /// Simulated time covered by the plan.
    pub fn simulated_time(&self) -> f64 {
        self.steps as f64 * self.step_size
    }
}

impl FixedStepper {
    /// Create a stepper. `max_substeps == 0` selects variable stepping.
    pub fn new(fixed_time_step: f64, max_substeps: u32) -> Self {
        Self {
            fixed_time_step,
            max_substeps,
            accumulator: 0.0,
        }
    }

    /// Fixed step size.
    pub fn fixed_time_step(&self) -> f64 {
        self.fixed_time_step
    }

    /// Change the fixed step size. Pending time is kept.
    pub fn set_fixed_time_step(&mut self, dt: f64) {
        self.fixed_time_step = dt;
    }

    /// Maximum steps per call.
    pub fn max_substeps(&self) -> u32 {
        self.max_substeps
    }

    /// Change the maximum steps per call.
    pub fn set_max_substeps(&mut self, max_substeps: u32) {
        self.max_substeps = max_substeps;
    }

    /// Time waiting for the next fixed step.
    pub fn pending_time(&self) -> f64 {
        self.accumulator
    }

    /// Account for `dt` seconds of frame time. Non-finite or non-positive
    /// `dt` plans nothing and leaves pending time untouched.
    pub fn plan(&mut self, dt: f64) -> StepPlan {
        if !dt.is_finite() || dt <= 0.0 {
            return StepPlan {
                steps: 0,
                step_size: self.fixed_time_step,
            };
        }

        if self.max_substeps == 0 {
            return StepPlan {
                steps: 1,
                step_size: dt,
            };
        }

        self.accumulator += dt;
        let due = (self.accumulator / self.fixed_time_step).floor();
        self.accumulator -= due * self.fixed_time_step;
        StepPlan {
            steps: (due as u32).min(self.max_substeps),
            step_size: self.fixed_time_step,
        }
    }
}

/// Wall-clock frame timer of the driving loop.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    previous_frame: Option<Instant>,
    previous_frame_duration: Option<Duration>,
}

impl Timeline {
    /// Create a stopped timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing from now.
    pub fn start(&mut self) {
        self.previous_frame = Some(Instant::now());
        self.previous_frame_duration = None;
    }

    /// Close the current frame.
    pub fn next_frame(&mut self) {
        let now = Instant::now();
        if let Some(previous) = self.previous_frame {
            self.previous_frame_duration = Some(now - previous);
        }
        self.previous_frame = Some(now);
    }

    /// Length of the last completed frame, if any.
    pub fn previous_frame_duration(&self) -> Option<Duration> {
        self.previous_frame_duration
    }
}

/// Wall-clock timing of `step_physics` calls.
#[derive(Debug, Clone, Default)]
pub struct StepProfiler {
    enabled: bool,
    total_frames: u64,
    total_elapsed: Duration,
    last_elapsed: Duration,
}

impl StepProfiler {
    /// Create a profiler; a disabled one records nothing.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    /// Whether timings are recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn recording on or off. Recorded timings are kept.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Forget all recorded timings.
    pub fn reset(&mut self) {
        self.total_frames = 0;
        self.total_elapsed = Duration::ZERO;
        self.last_elapsed = Duration::ZERO;
    }

    /// Record one step call.
    pub fn record(&mut self, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        self.total_frames += 1;
        self.total_elapsed += elapsed;
        self.last_elapsed = elapsed;
    }

    /// Number of recorded step calls.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Sum of recorded durations.
    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    /// Steps per second implied by the last call.
    pub fn steps_per_second(&self) -> Option<f64> {
        let secs = self.last_elapsed.as_secs_f64();
        (self.total_frames > 0 && secs > 0.0).then(|| 1.0 / secs)
    }

    /// Steps per second averaged over every recorded call.
    pub fn average_steps_per_second(&self) -> Option<f64> {
        let secs = self.total_elapsed.as_secs_f64();
        (self.total_frames > 0 && secs > 0.0).then(|| self.total_frames as f64 / secs)
    }
}

//! Fixed-timestep decoupler
//!
//! Splits wall-clock frame time into whole physics steps of a constant size and
//! reports how far the render frame sits between the last two simulated states.
//!
//! ```text
//! frame dt ──► accumulator ──► step(ts) × N ──► factor = accumulator / ts
//! ```
//!
//! The decoupler owns no world state. Stepping, copying previous transforms and
//! reading back poses all happen in the caller's per-step closure.

use std::convert::Infallible;

use thiserror::Error;

/// Default physics rate: 60 steps per simulated second.
pub const DEFAULT_TIMESTEP: f32 = 1.0 / 60.0;

/// Errors from constructing a [`FixedTimestep`]
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TimestepError {
    #[error("Fixed timestep must be finite and positive, got {0}")]
    InvalidTimestep(f32),
}

/// Result of a single [`FixedTimestep::advance`] call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Number of fixed steps taken during this frame
    pub steps: u32,
    /// Blend weight from previous to current simulated state, in `[0, 1)`
    pub factor: f32,
}

/// Accumulator that turns variable frame time into fixed physics steps
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    timestep: f32,
    accumulator: f32,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self {
            timestep: DEFAULT_TIMESTEP,
            accumulator: 0.0,
        }
    }
}

impl FixedTimestep {
    pub fn new(timestep: f32) -> Result<Self, TimestepError> {
        if !timestep.is_finite() || timestep <= 0.0 {
            return Err(TimestepError::InvalidTimestep(timestep));
        }
        Ok(Self {
            timestep,
            accumulator: 0.0,
        })
    }

    /// Size of one fixed step in seconds
    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    /// Time carried over to the next frame, always in `[0, timestep)`
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Fraction of a step the render frame sits past the current state
    pub fn interpolation_factor(&self) -> f32 {
        self.accumulator / self.timestep
    }

    /// Drop any carried-over time
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// Feed one frame of wall-clock time and run `step` once per whole timestep.
    pub fn advance(&mut self, dt: f32, mut step: impl FnMut(f32)) -> StepReport {
        let result: Result<StepReport, Infallible> = self.advance_with(dt, |timestep| {
            step(timestep);
            Ok(())
        });
        match result {
            Ok(report) => report,
            Err(never) => match never {},
        }
    }

    /// Same as [`advance`](Self::advance), but a failing step aborts the frame.
    ///
    /// On failure the remaining frame time is dropped and the accumulator
    /// restarts from zero.
    pub fn advance_with<E>(
        &mut self,
        dt: f32,
        mut step: impl FnMut(f32) -> Result<(), E>,
    ) -> Result<StepReport, E> {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let total = self.accumulator + dt;
        // Float-to-int casts saturate, so a huge total cannot wrap.
        let steps = (total / self.timestep).floor() as u32;

        for _ in 0..steps {
            if let Err(err) = step(self.timestep) {
                self.accumulator = 0.0;
                return Err(err);
            }
        }

        let remainder = total - steps as f32 * self.timestep;
        // Rounding can leave a residue just outside [0, timestep).
        self.accumulator = if (0.0..self.timestep).contains(&remainder) {
            remainder
        } else {
            0.0
        };

        Ok(StepReport {
            steps,
            factor: self.interpolation_factor(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TS: f32 = DEFAULT_TIMESTEP;

    /// Deterministic spread of frame times: stalls, sub-step frames, exact multiples.
    fn frame_times() -> Vec<f32> {
        let mut seed: u32 = 0x2545_f491;
        let mut out = vec![0.0, TS, 2.0 * TS, TS * 0.5, 0.25, 1e-6, 3.3 * TS];
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            out.push((seed >> 8) as f32 / (1u32 << 24) as f32 * 0.1);
        }
        out
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-0.5)]
    #[case::nan(f32::NAN)]
    #[case::infinite(f32::INFINITY)]
    fn rejects_invalid_timestep(#[case] timestep: f32) {
        assert!(FixedTimestep::new(timestep).is_err());
    }

    #[rstest]
    #[case::no_time(0.0, 0)]
    #[case::sub_step(TS * 0.5, 0)]
    #[case::exactly_one(TS, 1)]
    #[case::two_and_a_half(TS * 2.5, 2)]
    #[case::long_stall(TS * 15.5, 15)]
    fn takes_whole_steps_only(#[case] dt: f32, #[case] expected: u32) {
        let mut timestep = FixedTimestep::default();
        let mut calls = 0;
        let report = timestep.advance(dt, |step| {
            assert_eq!(step, TS);
            calls += 1;
        });
        assert_eq!(report.steps, expected);
        assert_eq!(calls, expected);
    }

    #[test]
    fn accumulator_stays_below_one_step() {
        let mut timestep = FixedTimestep::default();
        for dt in frame_times() {
            timestep.advance(dt, |_| {});
            let acc = timestep.accumulator();
            assert!((0.0..TS).contains(&acc), "accumulator {acc} after dt {dt}");
        }
    }

    #[test]
    fn step_count_matches_floor_of_total() {
        let mut timestep = FixedTimestep::default();
        for dt in frame_times() {
            let before = timestep.accumulator();
            let expected = ((before + dt) / TS).floor() as u32;
            let report = timestep.advance(dt, |_| {});
            assert_eq!(report.steps, expected, "before {before}, dt {dt}");
        }
    }

    #[test]
    fn factor_grows_between_steps_and_resets_after() {
        let mut timestep = FixedTimestep::default();
        let mut last = timestep.interpolation_factor();
        for _ in 0..200 {
            let report = timestep.advance(TS * 0.3, |_| {});
            assert!((0.0..1.0).contains(&report.factor));
            if report.steps == 0 {
                assert!(report.factor >= last);
            }
            last = report.factor;
        }
    }

    #[test]
    fn bad_frame_time_counts_as_zero() {
        let mut timestep = FixedTimestep::default();
        timestep.advance(TS * 0.5, |_| {});
        let before = timestep.accumulator();

        for dt in [-1.0, f32::NAN, f32::NEG_INFINITY, f32::INFINITY] {
            let report = timestep.advance(dt, |_| panic!("no step expected"));
            assert_eq!(report.steps, 0);
            assert_eq!(timestep.accumulator(), before);
        }
    }

    #[test]
    fn failing_step_aborts_the_frame() {
        let mut timestep = FixedTimestep::default();
        let mut calls = 0;
        let result = timestep.advance_with(TS * 5.0, |_| {
            calls += 1;
            if calls == 2 {
                Err("solver blew up")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("solver blew up"));
        assert_eq!(calls, 2);
        assert_eq!(timestep.accumulator(), 0.0);
    }

    #[test]
    fn reset_drops_carried_time() {
        let mut timestep = FixedTimestep::new(0.1).unwrap();
        timestep.advance(0.05, |_| {});
        assert!(timestep.accumulator() > 0.0);
        timestep.reset();
        assert_eq!(timestep.interpolation_factor(), 0.0);
    }
}

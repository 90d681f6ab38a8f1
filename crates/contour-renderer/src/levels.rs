//! Contour level state and threshold generation.
//!
//! Two discrete counters (positive and negative, 0 to 20) control how
//! aggressively low-intensity isolines are suppressed. Each counter
//! feeds a geometric ladder of thresholds anchored at the grid's noise
//! floor, so a level step roughly halves or doubles the faintest visible
//! contour.

use serde::{Deserialize, Serialize};
use spectrum_grid::{Grid, SpectrumId};

use crate::error::{ContourError, Result};

/// Lowest contour level.
pub const LEVEL_MIN: i32 = 0;
/// Highest contour level.
pub const LEVEL_MAX: i32 = 20;
/// Level both counters start at.
pub const DEFAULT_LEVEL: i32 = 10;
/// Number of thresholds in a ladder.
pub const DEFAULT_NB_LEVELS: usize = 10;

const LADDER_EXP: f64 = 2.0;

/// Contour envelope sign. 2D spectra carry independently controllable
/// positive and negative intensity envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    Positive,
    Negative,
}

/// A wheel event reduced to what level adjustment needs.
///
/// Constructed at the input boundary from the raw wheel delta, keeping
/// the level state machine independent of any event system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelInput {
    /// -1, 0 or +1.
    pub delta_sign: i32,
    /// Whether the shift modifier was held.
    pub shift_held: bool,
}

impl WheelInput {
    /// Create a wheel input; `delta_sign` is normalized to its signum.
    pub fn new(delta_sign: i32, shift_held: bool) -> Self {
        Self {
            delta_sign: delta_sign.signum(),
            shift_held,
        }
    }

    /// Reduce a raw wheel delta to its sign. NaN deltas become no-ops.
    pub fn from_raw_delta(delta_y: f64, shift_held: bool) -> Self {
        let delta_sign = if delta_y > 0.0 {
            1
        } else if delta_y < 0.0 {
            -1
        } else {
            0
        };
        Self {
            delta_sign,
            shift_held,
        }
    }
}

/// The two contour level counters, bound to the spectrum they were
/// initiated for.
///
/// A value type: `adjust` returns a new state, and switching the active
/// spectrum must go through [`LevelState::initiate`] so the binding is
/// rebuilt. Operations that mix a state with a grid verify the binding
/// and fail with [`ContourError::SpectrumMismatch`] on stale use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelState {
    positive: i32,
    negative: i32,
    spectrum_id: SpectrumId,
}

impl LevelState {
    /// Bind fresh level state to a grid, both counters at the default
    /// mid-point.
    pub fn initiate(grid: &Grid) -> Self {
        Self {
            positive: DEFAULT_LEVEL,
            negative: DEFAULT_LEVEL,
            spectrum_id: grid.spectrum_id(),
        }
    }

    /// Current positive level.
    pub fn positive(&self) -> i32 {
        self.positive
    }

    /// Current negative level.
    pub fn negative(&self) -> i32 {
        self.negative
    }

    /// The spectrum this state was initiated for.
    pub fn spectrum_id(&self) -> SpectrumId {
        self.spectrum_id
    }

    /// Apply one wheel step.
    ///
    /// Without shift both counters move together; with shift only the
    /// negative counter moves, decoupling the negative envelope. Each
    /// counter clamps to `[LEVEL_MIN, LEVEL_MAX]` independently, so one
    /// may saturate while the other keeps moving.
    pub fn adjust(self, input: WheelInput) -> Self {
        let step = input.delta_sign.signum();
        let negative = (self.negative + step).clamp(LEVEL_MIN, LEVEL_MAX);
        let positive = if input.shift_held {
            self.positive
        } else {
            (self.positive + step).clamp(LEVEL_MIN, LEVEL_MAX)
        };
        Self {
            positive,
            negative,
            spectrum_id: self.spectrum_id,
        }
    }

    fn level_for(&self, sign: Sign) -> i32 {
        match sign {
            Sign::Positive => self.positive,
            Sign::Negative => self.negative,
        }
    }
}

/// An ordered sequence of intensity thresholds for one envelope sign,
/// bound to the spectrum it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdLadder {
    sign: Sign,
    spectrum_id: SpectrumId,
    levels: Vec<f64>,
}

impl ThresholdLadder {
    /// Build a ladder from explicit threshold values.
    pub fn new(sign: Sign, spectrum_id: SpectrumId, levels: Vec<f64>) -> Result<Self> {
        if levels.is_empty() {
            return Err(ContourError::EmptyLadder);
        }
        Ok(Self {
            sign,
            spectrum_id,
            levels,
        })
    }

    /// The envelope sign this ladder belongs to.
    pub fn sign(&self) -> Sign {
        self.sign
    }

    /// The spectrum this ladder was computed for.
    pub fn spectrum_id(&self) -> SpectrumId {
        self.spectrum_id
    }

    /// The threshold values, from the strongest contour down towards the
    /// noise floor.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }
}

/// Build the threshold ladder for one sign with the default level count.
pub fn build_thresholds(state: &LevelState, grid: &Grid, sign: Sign) -> Result<ThresholdLadder> {
    build_thresholds_with(state, grid, sign, DEFAULT_NB_LEVELS)
}

/// Build the threshold ladder for one sign.
///
/// The faintest threshold is `noise * 3 * 2^(level/2 + 1)` and the
/// strongest approaches the grid's largest absolute intensity; spacing
/// follows a geometric series with exponent 2, denser near the noise
/// floor where contour density concentrates. The negative ladder is the
/// negation of this, computed with the negative counter.
///
/// A degenerate range (`high == low`) yields the threshold repeated
/// `nb_levels` times; there is no division by the range anywhere.
pub fn build_thresholds_with(
    state: &LevelState,
    grid: &Grid,
    sign: Sign,
    nb_levels: usize,
) -> Result<ThresholdLadder> {
    if nb_levels == 0 {
        return Err(ContourError::EmptyLadder);
    }
    if state.spectrum_id() != grid.spectrum_id() {
        return Err(ContourError::SpectrumMismatch {
            state: state.spectrum_id(),
            grid: grid.spectrum_id(),
        });
    }

    let level = state.level_for(sign);
    let zoom = level as f64 / 2.0 + 1.0;
    let low = grid.noise() * 3.0 * 2f64.powf(zoom);
    let high = grid.max_abs_z();

    let mut partial = Vec::with_capacity(nb_levels + 1);
    partial.push(0.0);
    for i in 1..=nb_levels {
        let prev = partial[i - 1];
        partial.push(prev + (LADDER_EXP - 1.0) / LADDER_EXP.powi(i as i32));
    }
    let total = partial[nb_levels];

    let flip = match sign {
        Sign::Positive => 1.0,
        Sign::Negative => -1.0,
    };
    let levels = (1..=nb_levels)
        .map(|i| flip * (high - (high - low) * partial[i] / total))
        .collect();

    ThresholdLadder::new(sign, grid.spectrum_id(), levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectrum_grid::DomainBounds;

    fn grid(noise: f64, peak: f64) -> Grid {
        let rows = vec![vec![0.0, peak], vec![0.0, 0.0]];
        Grid::from_rows(DomainBounds::new(0.0, 1.0, 0.0, 1.0), rows, noise).unwrap()
    }

    #[test]
    fn test_initiate_defaults() {
        let g = grid(1.0, 100.0);
        let state = LevelState::initiate(&g);
        assert_eq!(state.positive(), 10);
        assert_eq!(state.negative(), 10);
        assert_eq!(state.spectrum_id(), g.spectrum_id());
    }

    #[test]
    fn test_wheel_input_signum() {
        assert_eq!(WheelInput::new(17, false).delta_sign, 1);
        assert_eq!(WheelInput::new(-3, false).delta_sign, -1);
        assert_eq!(WheelInput::from_raw_delta(-120.0, true).delta_sign, -1);
        assert_eq!(WheelInput::from_raw_delta(0.0, false).delta_sign, 0);
        assert_eq!(WheelInput::from_raw_delta(f64::NAN, false).delta_sign, 0);
    }

    #[test]
    fn test_ladder_low_anchor() {
        let g = grid(1.0, 10_000.0);
        let state = LevelState::initiate(&g);
        let ladder = build_thresholds(&state, &g, Sign::Positive).unwrap();

        // level 10: zoom 6, low = 1 * 3 * 64
        let last = *ladder.levels().last().unwrap();
        assert!((last - 192.0).abs() < 1e-9);
    }

    #[test]
    fn test_ladder_spacing_denser_near_low() {
        let g = grid(1.0, 10_000.0);
        let state = LevelState::initiate(&g);
        let ladder = build_thresholds(&state, &g, Sign::Positive).unwrap();
        let l = ladder.levels();

        assert_eq!(l.len(), DEFAULT_NB_LEVELS);
        for w in l.windows(2) {
            assert!(w[0] > w[1]);
        }
        assert!(l[0] - l[1] > l[8] - l[9]);
    }

    #[test]
    fn test_degenerate_range_repeats_threshold() {
        // noise * 3 * 2^6 == 192 == max_abs_z
        let g = grid(1.0, 192.0);
        let state = LevelState::initiate(&g);
        let ladder = build_thresholds(&state, &g, Sign::Positive).unwrap();

        assert!(ladder.levels().iter().all(|&t| t == 192.0));
    }

    #[test]
    fn test_zero_levels_rejected() {
        let g = grid(1.0, 100.0);
        let state = LevelState::initiate(&g);
        assert!(matches!(
            build_thresholds_with(&state, &g, Sign::Positive, 0),
            Err(ContourError::EmptyLadder)
        ));
    }

    #[test]
    fn test_mismatched_grid_rejected() {
        let a = grid(1.0, 100.0);
        let b = grid(1.0, 100.0);
        let state = LevelState::initiate(&a);
        assert!(matches!(
            build_thresholds(&state, &b, Sign::Positive),
            Err(ContourError::SpectrumMismatch { .. })
        ));
    }
}

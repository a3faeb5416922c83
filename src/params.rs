//! Iteration parameters read by every pixel computation.

use log::debug;

pub const DEFAULT_MAX_ITERS: u32 = 50;
pub const DEFAULT_DIVERGENCE_CAP: f64 = 2.0;

/// Multiplicative step applied by the interactive increase/decrease keys.
pub const STEP_UP: f64 = 1.2;
pub const STEP_DOWN: f64 = 0.8;

/// Floor for divergence-cap decreases; the cap must stay positive.
const MIN_DIVERGENCE_CAP: f64 = 1e-3;

/// Escape-iteration cap, divergence threshold, and the derived colour scale.
///
/// The fields are private so that `color_scale` can never be observed stale:
/// every mutation of `max_iters` recomputes it in the same call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterParams {
    max_iters: u32,
    divergence_cap: f64,
    color_scale: u8,
}

impl Default for IterParams {
    fn default() -> Self {
        IterParams {
            max_iters: DEFAULT_MAX_ITERS,
            divergence_cap: DEFAULT_DIVERGENCE_CAP,
            color_scale: derive_color_scale(DEFAULT_MAX_ITERS),
        }
    }
}

/// `255 / max_iters`, in integer division. For caps above 255 this is 0 and
/// every escaped pixel renders black, matching the 8-bit intensity range.
fn derive_color_scale(max_iters: u32) -> u8 {
    (u8::MAX as u32 / max_iters) as u8
}

impl IterParams {
    pub fn max_iters(&self) -> u32 {
        self.max_iters
    }

    pub fn divergence_cap(&self) -> f64 {
        self.divergence_cap
    }

    pub fn color_scale(&self) -> u8 {
        self.color_scale
    }

    /// Scale the iteration cap, truncating toward zero and clamping to a
    /// minimum of 1 so the derived colour scale is never a division by zero.
    pub fn scale_max_iters(&mut self, factor: f64) {
        self.max_iters = ((self.max_iters as f64 * factor) as u32).max(1);
        self.color_scale = derive_color_scale(self.max_iters);
        debug!("max iters: {}", self.max_iters);
    }

    pub fn scale_divergence_cap(&mut self, factor: f64) {
        self.divergence_cap = (self.divergence_cap * factor).max(MIN_DIVERGENCE_CAP);
        debug!("divergence cap: {}", self.divergence_cap);
    }

    pub fn reset(&mut self) {
        *self = IterParams::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration() {
        let params = IterParams::default();
        assert_eq!(params.max_iters(), 50);
        assert_eq!(params.divergence_cap(), 2.0);
        assert_eq!(params.color_scale(), 5);
    }

    #[test]
    fn increase_truncates_toward_zero() {
        let mut params = IterParams::default();
        params.scale_max_iters(STEP_UP);
        assert_eq!(params.max_iters(), 60);
        assert_eq!(params.color_scale(), 255 / 60);
    }

    #[test]
    fn repeated_decrease_clamps_at_one() {
        let mut params = IterParams::default();
        for _ in 0..100 {
            params.scale_max_iters(STEP_DOWN);
            assert!(params.max_iters() >= 1);
            assert_eq!(
                params.color_scale() as u32,
                u8::MAX as u32 / params.max_iters()
            );
        }
        assert_eq!(params.max_iters(), 1);
        assert_eq!(params.color_scale(), 255);
    }

    #[test]
    fn divergence_cap_stays_above_the_floor() {
        let mut params = IterParams::default();
        for _ in 0..200 {
            params.scale_divergence_cap(STEP_DOWN);
        }
        assert!(params.divergence_cap() > 0.0);
        assert_eq!(params.divergence_cap(), MIN_DIVERGENCE_CAP);
    }

    #[test]
    fn caps_above_255_scale_to_zero() {
        let mut params = IterParams::default();
        for _ in 0..10 {
            params.scale_max_iters(STEP_UP);
        }
        assert!(params.max_iters() > 255);
        assert_eq!(params.color_scale(), 0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut params = IterParams::default();
        params.scale_max_iters(STEP_UP);
        params.scale_divergence_cap(STEP_DOWN);

        params.reset();

        assert_eq!(params, IterParams::default());
    }
}

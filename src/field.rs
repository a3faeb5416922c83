//! The dense grid of complex samples behind the pixel grid.

use log::trace;
use rayon::prelude::*;

use crate::{pixel::Complex, screen::Size, viewport::Viewport};

/// Row-major cache of one sample point per pixel.
///
/// Allocated once and regenerated in place. The grid does not watch the
/// viewport; it records the viewport generation it was produced under and
/// [`SampleGrid::sync`] regenerates only on mismatch. Parameter-only changes
/// never touch it.
pub struct SampleGrid {
    size: Size,
    samples: Vec<Complex>,
    stamp: Option<u64>,
}

impl SampleGrid {
    pub fn new(size: Size) -> Self {
        SampleGrid {
            size,
            samples: vec![Complex::ZERO; size.pixel_count()],
            stamp: None,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn samples(&self) -> &[Complex] {
        &self.samples
    }

    /// Recompute every sample from `viewport`.
    ///
    /// Cells are independent, so rows are filled in parallel; each worker
    /// owns a disjoint row slice.
    pub fn regenerate(&mut self, viewport: &Viewport) {
        trace!("begin field regeneration");

        let width = self.size.width;
        let step_x = viewport.extent.0 / width as f64;
        let step_y = viewport.extent.1 / self.size.height as f64;
        let origin_x = viewport.center.0 - viewport.extent.0 / 2.0;
        let origin_y = viewport.center.1 - viewport.extent.1 / 2.0;

        self.samples
            .par_chunks_exact_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let im = origin_y + step_y * y as f64;
                for (x, sample) in row.iter_mut().enumerate() {
                    *sample = Complex::new(origin_x + step_x * x as f64, im);
                }
            });

        self.stamp = Some(viewport.generation());
        trace!("end field regeneration");
    }

    /// Regenerate only if the cached samples predate the viewport's current
    /// generation.
    pub fn sync(&mut self, viewport: &Viewport) {
        if self.stamp != Some(viewport.generation()) {
            self.regenerate(viewport);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Size = Size {
        width: 16,
        height: 16,
    };

    #[test]
    fn samples_follow_the_viewport_formula() {
        let viewport = Viewport::default();
        let mut grid = SampleGrid::new(SIZE);
        grid.regenerate(&viewport);

        // Top-left sample sits at the viewport origin.
        assert_eq!(grid.samples()[0], Complex::new(-2.1, -1.0));

        // Row-major indexing: (x, y) = (8, 8) lands on the viewport centre.
        let centre = grid.samples()[8 * 16 + 8];
        assert!((centre.re + 0.6).abs() < 1e-12);
        assert_eq!(centre.im, 0.0);

        // One step right of the origin.
        assert_eq!(grid.samples()[1], Complex::new(-2.1 + 3.0 / 16.0, -1.0));
    }

    #[test]
    fn vertical_coordinate_grows_with_the_row() {
        let viewport = Viewport::default();
        let mut grid = SampleGrid::new(SIZE);
        grid.regenerate(&viewport);

        assert!(grid.samples()[15 * 16].im > grid.samples()[0].im);
    }

    #[test]
    fn sync_skips_regeneration_for_an_unchanged_viewport() {
        let viewport = Viewport::default();
        let mut grid = SampleGrid::new(SIZE);
        grid.sync(&viewport);
        let before = grid.samples().to_vec();

        grid.sync(&viewport);

        assert_eq!(grid.samples(), &before[..]);
    }

    #[test]
    fn sync_regenerates_after_a_zoom() {
        let mut viewport = Viewport::default();
        let mut grid = SampleGrid::new(SIZE);
        grid.sync(&viewport);
        let before = grid.samples().to_vec();

        assert!(viewport.zoom_to_rect((4, 4), (12, 12), SIZE));
        grid.sync(&viewport);

        assert_ne!(grid.samples(), &before[..]);
    }
}

//! Grayscale colouring of escape counts.

use log::trace;
use rayon::prelude::*;

use crate::{escape, field::SampleGrid, params::IterParams};

/// 8-bit intensity for an escape count: `color_scale × (max_iters − count)`,
/// truncated to the low byte.
///
/// The mapping is deliberately inverted: points that survive all iterations
/// render black, points that escape immediately render brightest.
pub fn intensity(count: u32, params: &IterParams) -> u8 {
    (params.color_scale() as u32).wrapping_mul(params.max_iters() - count) as u8
}

/// Replicate an intensity into all four byte lanes of a packed pixel, so the
/// encoding is grayscale under any channel ordering.
pub fn pack(intensity: u8) -> u32 {
    let lane = intensity as u32;
    (lane << 24) | (lane << 16) | (lane << 8) | lane
}

/// Render the whole grid into the caller-supplied pixel buffer.
///
/// Each worker owns a disjoint output row, so no synchronisation is needed
/// beyond the join implied by the parallel iterator, and the output is
/// identical for any worker count. The buffer is only borrowed for the
/// duration of the pass.
pub fn render(grid: &SampleGrid, params: &IterParams, pixels: &mut [u32]) {
    trace!("begin render pass");
    debug_assert_eq!(pixels.len(), grid.size().pixel_count());

    let width = grid.size().width as usize;
    let max_iters = params.max_iters();
    let divergence_cap = params.divergence_cap();

    pixels
        .par_chunks_exact_mut(width)
        .zip(grid.samples().par_chunks_exact(width))
        .for_each(|(row, samples)| {
            for (pixel, &sample) in row.iter_mut().zip(samples) {
                let count = escape::escape_count(sample, max_iters, divergence_cap);
                *pixel = pack(intensity(count, params));
            }
        });

    trace!("end render pass");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{screen::Size, viewport::Viewport};

    #[test]
    fn immediate_escape_is_brightest() {
        let params = IterParams::default();
        assert_eq!(intensity(0, &params), 250);
    }

    #[test]
    fn never_escaping_is_black() {
        let params = IterParams::default();
        assert_eq!(intensity(params.max_iters(), &params), 0);
    }

    #[test]
    fn pack_replicates_all_four_lanes() {
        assert_eq!(pack(0), 0x0000_0000);
        assert_eq!(pack(5), 0x0505_0505);
        assert_eq!(pack(250), 0xfafa_fafa);
    }

    #[test]
    fn render_classifies_interior_and_exterior_points() {
        let size = Size {
            width: 16,
            height: 16,
        };
        let viewport = Viewport::default();
        let params = IterParams::default();
        let mut grid = SampleGrid::new(size);
        grid.regenerate(&viewport);
        let mut pixels = vec![0u32; size.pixel_count()];

        render(&grid, &params, &mut pixels);

        // The top-left sample (-2.1, -1.0) escapes before the first test.
        assert_eq!(pixels[0], pack(250));
        // The sample at the viewport centre (-0.6, 0.0) never escapes.
        assert_eq!(pixels[8 * 16 + 8], pack(0));
    }

    #[test]
    fn render_depends_on_params_without_regeneration() {
        let size = Size {
            width: 16,
            height: 16,
        };
        let viewport = Viewport::default();
        let mut params = IterParams::default();
        let mut grid = SampleGrid::new(size);
        grid.regenerate(&viewport);

        let mut before = vec![0u32; size.pixel_count()];
        render(&grid, &params, &mut before);

        for _ in 0..4 {
            params.scale_max_iters(crate::params::STEP_DOWN);
        }
        let mut after = vec![0u32; size.pixel_count()];
        render(&grid, &params, &mut after);

        assert_ne!(before, after);
    }
}

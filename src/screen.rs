use bytemuck::{Pod, Zeroable};

/// Pixel-grid dimensions. Fixed for the lifetime of the process; also
/// uploaded to the presentation shader, hence the [`bytemuck`] derives.
#[repr(C)]
#[derive(Pod, Zeroable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Clamp a host-reported cursor position into the grid.
    ///
    /// The window is created at exactly the grid size, but cursor events can
    /// still report coordinates outside it (e.g. while a mouse button is held
    /// during a drag that leaves the window).
    pub fn clamp_cursor(&self, x: f64, y: f64) -> (u32, u32) {
        (clamp_axis(x, self.width), clamp_axis(y, self.height))
    }
}

fn clamp_axis(value: f64, dimension: u32) -> u32 {
    value.clamp(0.0, (dimension - 1) as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_cursor_keeps_in_bounds_coordinates() {
        let size = Size {
            width: 640,
            height: 480,
        };
        assert_eq!(size.clamp_cursor(10.0, 20.0), (10, 20));
    }

    #[test]
    fn clamp_cursor_clamps_out_of_bounds_coordinates() {
        let size = Size {
            width: 640,
            height: 480,
        };
        assert_eq!(size.clamp_cursor(-5.0, 1000.0), (0, 479));
        assert_eq!(size.clamp_cursor(640.0, -0.5), (639, 0));
    }
}

/*!
An interactive Mandelbrot explorer that iterates on the CPU.

The fractal field engine lives in this library: [`viewport`] maps a region of
the complex plane onto the pixel grid, [`field`] materialises the per-pixel
sample points, [`escape`] classifies each sample, and [`colour`] packs the
results into a pixel buffer. The binary owns the window and the `wgpu`
presentation glue, which only ever sees the finished buffer.
*/

pub mod colour;
pub mod command_encoder;
pub mod escape;
pub mod field;
pub mod params;
pub mod pixel;
pub mod screen;
pub mod var;
pub mod viewport;

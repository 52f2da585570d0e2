//! Pure calculation functions for output size and placement.
//!
//! All functions here are pure and testable without any I/O or images.
//! Scaling always truncates (`floor`, `ceil` or an integer cast), never
//! rounds to nearest, so output sizes are reproducible bit-for-bit.

use super::backend::Dimensions;
use super::error::ResizeError;
use crate::options::{Algo, Gravity, Options};
use serde::Serialize;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<Dimensions> for Size {
    fn from(dims: Dimensions) -> Self {
        Self::new(dims.width, dims.height)
    }
}

/// Axis-aligned rectangle: origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether this rectangle lies entirely inside a `container`-sized canvas.
    pub fn fits_within(&self, container: Size) -> bool {
        self.x as u64 + self.width as u64 <= container.width as u64
            && self.y as u64 + self.height as u64 <= container.height as u64
    }
}

/// Placement decision for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "algo", rename_all = "lowercase")]
pub enum Geometry {
    /// Resize the source into `placement` and composite it onto a
    /// background-filled canvas of size `canvas`.
    Fit {
        canvas: Size,
        ratio: f64,
        placement: Rect,
    },
    /// Resize the source to `intermediate`, then cut out `crop`.
    Fill {
        output: Size,
        ratio: f64,
        intermediate: Size,
        crop: Rect,
    },
}

impl Geometry {
    /// Final raster size.
    pub fn output(&self) -> Size {
        match self {
            Geometry::Fit { canvas, .. } => *canvas,
            Geometry::Fill { output, .. } => *output,
        }
    }

    /// Uniform scale factor applied to the source.
    pub fn ratio(&self) -> f64 {
        match self {
            Geometry::Fit { ratio, .. } | Geometry::Fill { ratio, .. } => *ratio,
        }
    }

    pub fn placement(&self) -> Rect {
        match self {
            Geometry::Fit { placement, .. } => *placement,
            Geometry::Fill { crop, .. } => *crop,
        }
    }

    /// Size of the raster the placement rectangle is measured against.
    pub fn container(&self) -> Size {
        match self {
            Geometry::Fit { canvas, .. } => *canvas,
            Geometry::Fill { intermediate, .. } => *intermediate,
        }
    }

    /// Only FILL resizes to an intermediate raster.
    pub fn intermediate(&self) -> Option<Size> {
        match self {
            Geometry::Fit { .. } => None,
            Geometry::Fill { intermediate, .. } => Some(*intermediate),
        }
    }

    pub fn algo(&self) -> Algo {
        match self {
            Geometry::Fit { .. } => Algo::Fit,
            Geometry::Fill { .. } => Algo::Fill,
        }
    }
}

/// Resolve the final output size from the requested options.
///
/// Zero `width`/`height` fall back to the source dimensions. Then at most
/// one bound applies, checked in the order `max_side`, `max_height`,
/// `max_width`. A bound that is already satisfied leaves the size untouched.
///
/// # Examples
/// ```
/// # use trez::imaging::{Dimensions, calculate_output_size};
/// # use trez::Options;
/// let options = Options { max_side: 100, ..Options::default() };
/// let size = calculate_output_size(&options, Dimensions { width: 800, height: 400 });
/// assert_eq!((size.width, size.height), (100, 50));
/// ```
pub fn calculate_output_size(options: &Options, source: Dimensions) -> Size {
    let width = if options.width == 0 {
        source.width
    } else {
        options.width
    };
    let height = if options.height == 0 {
        source.height
    } else {
        options.height
    };

    if options.max_side > 0 {
        let max_side = options.max_side;
        if width <= max_side && height <= max_side {
            return Size::new(width, height);
        }
        let longer = if width >= height { width } else { height };
        return scale_size(width, height, ratio_f32(max_side, longer));
    }
    if options.max_height > 0 {
        if height <= options.max_height {
            return Size::new(width, height);
        }
        return scale_size(width, height, ratio_f32(options.max_height, height));
    }
    if options.max_width > 0 {
        if width <= options.max_width {
            return Size::new(width, height);
        }
        return scale_size(width, height, ratio_f32(options.max_width, width));
    }

    Size::new(width, height)
}

// Bounds are applied in f32; f64 gives different sizes for some inputs.
fn ratio_f32(bound: u32, side: u32) -> f32 {
    bound as f32 / side as f32
}

fn scale_size(width: u32, height: u32, ratio: f32) -> Size {
    Size::new(
        (width as f32 * ratio) as u32,
        (height as f32 * ratio) as u32,
    )
}

/// Origin of `inner` inside `container` for the given anchor.
///
/// Halves truncate. Differences saturate at zero, so the result never
/// starts outside the container.
pub fn gravity_origin(container: Size, inner: Size, gravity: Gravity) -> (u32, u32) {
    let dx = container.width.saturating_sub(inner.width);
    let dy = container.height.saturating_sub(inner.height);

    match gravity {
        Gravity::Center => (dx / 2, dy / 2),
        Gravity::North => (dx / 2, 0),
        Gravity::South => (dx / 2, dy),
        Gravity::West => (0, dy / 2),
        Gravity::East => (dx, dy / 2),
        Gravity::NorthWest => (0, 0),
        Gravity::NorthEast => (dx, 0),
        Gravity::SouthWest => (0, dy),
        Gravity::SouthEast => (dx, dy),
    }
}

/// Compute the scale ratio, intermediate size and placement rectangle.
///
/// # Errors
/// [`ResizeError::InvalidSourceFormat`] if the source has a zero side.
pub fn plan_geometry(
    output: Size,
    source: Dimensions,
    algo: Algo,
    gravity: Gravity,
) -> Result<Geometry, ResizeError> {
    if source.width == 0 || source.height == 0 {
        return Err(ResizeError::InvalidSourceFormat);
    }

    let xf = output.width as f64 / source.width as f64;
    let yf = output.height as f64 / source.height as f64;

    let geometry = match algo {
        Algo::Fit => {
            let ratio = xf.min(yf);
            let placed = Size::new(
                (source.width as f64 * ratio).floor() as u32,
                (source.height as f64 * ratio).floor() as u32,
            );
            let (x, y) = gravity_origin(output, placed, gravity);
            Geometry::Fit {
                canvas: output,
                ratio,
                placement: Rect::new(x, y, placed.width, placed.height),
            }
        }
        Algo::Fill => {
            let ratio = xf.max(yf);
            let intermediate = Size::new(
                (source.width as f64 * ratio).ceil() as u32,
                (source.height as f64 * ratio).ceil() as u32,
            );
            let (x, y) = gravity_origin(intermediate, output, gravity);
            Geometry::Fill {
                output,
                ratio,
                intermediate,
                crop: Rect::new(x, y, output.width, output.height),
            }
        }
    };

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    // =========================================================================
    // calculate_output_size tests
    // =========================================================================

    #[test]
    fn output_size_passes_through_source() {
        let size = calculate_output_size(&Options::default(), dims(800, 600));
        assert_eq!(size, Size::new(800, 600));
    }

    #[test]
    fn output_size_explicit_dimensions() {
        let options = Options {
            width: 320,
            height: 200,
            ..Options::default()
        };
        assert_eq!(
            calculate_output_size(&options, dims(800, 600)),
            Size::new(320, 200)
        );
    }

    #[test]
    fn output_size_fills_only_missing_dimension() {
        let options = Options {
            width: 320,
            ..Options::default()
        };
        // Height is taken verbatim from the source, not scaled
        assert_eq!(
            calculate_output_size(&options, dims(800, 600)),
            Size::new(320, 600)
        );
    }

    #[test]
    fn max_side_landscape() {
        let options = Options {
            max_side: 100,
            ..Options::default()
        };
        // 100 / 800 = 0.125
        assert_eq!(
            calculate_output_size(&options, dims(800, 400)),
            Size::new(100, 50)
        );
    }

    #[test]
    fn max_side_portrait_uses_height() {
        let options = Options {
            max_side: 300,
            ..Options::default()
        };
        assert_eq!(
            calculate_output_size(&options, dims(600, 1200)),
            Size::new(150, 300)
        );
    }

    #[test]
    fn max_side_already_within_bound() {
        let options = Options {
            max_side: 1000,
            ..Options::default()
        };
        assert_eq!(
            calculate_output_size(&options, dims(800, 600)),
            Size::new(800, 600)
        );
    }

    #[test]
    fn max_side_truncates() {
        let options = Options {
            max_side: 100,
            ..Options::default()
        };
        // 300 * (100 / 800) = 37.5 → 37
        assert_eq!(
            calculate_output_size(&options, dims(800, 300)),
            Size::new(100, 37)
        );
    }

    #[test]
    fn max_height_scales_both() {
        let options = Options {
            max_height: 150,
            ..Options::default()
        };
        assert_eq!(
            calculate_output_size(&options, dims(800, 600)),
            Size::new(200, 150)
        );
    }

    #[test]
    fn max_height_ignores_wide_image() {
        let options = Options {
            max_height: 600,
            ..Options::default()
        };
        assert_eq!(
            calculate_output_size(&options, dims(4000, 600)),
            Size::new(4000, 600)
        );
    }

    #[test]
    fn max_width_scales_both() {
        let options = Options {
            max_width: 400,
            ..Options::default()
        };
        assert_eq!(
            calculate_output_size(&options, dims(800, 600)),
            Size::new(400, 300)
        );
    }

    #[test]
    fn bounds_scale_in_single_precision() {
        // 100/171 in f32 times 171 lands just under 100; in f64 it is exact
        let options = Options {
            max_width: 100,
            ..Options::default()
        };
        assert_eq!(
            calculate_output_size(&options, dims(171, 128)),
            Size::new(99, 74)
        );
        // and the other way: f64 lands under 100, f32 rounds up to it
        assert_eq!(
            calculate_output_size(&options, dims(161, 120)),
            Size::new(100, 74)
        );

        let options = Options {
            max_side: 100,
            ..Options::default()
        };
        assert_eq!(
            calculate_output_size(&options, dims(171, 128)),
            Size::new(99, 74)
        );
    }

    #[test]
    fn max_side_wins_over_other_bounds() {
        let options = Options {
            max_side: 400,
            max_height: 10,
            max_width: 10,
            ..Options::default()
        };
        assert_eq!(
            calculate_output_size(&options, dims(800, 600)),
            Size::new(400, 300)
        );
    }

    #[test]
    fn max_height_wins_over_max_width() {
        let options = Options {
            max_height: 300,
            max_width: 10,
            ..Options::default()
        };
        assert_eq!(
            calculate_output_size(&options, dims(800, 600)),
            Size::new(400, 300)
        );
    }

    #[test]
    fn bounds_apply_to_explicit_dimensions() {
        let options = Options {
            width: 1000,
            height: 500,
            max_width: 500,
            ..Options::default()
        };
        assert_eq!(
            calculate_output_size(&options, dims(10, 10)),
            Size::new(500, 250)
        );
    }

    // =========================================================================
    // gravity_origin tests
    // =========================================================================

    #[test]
    fn gravity_table() {
        let container = Size::new(100, 60);
        let inner = Size::new(41, 21);
        let cases = [
            (Gravity::Center, (29, 19)),
            (Gravity::North, (29, 0)),
            (Gravity::South, (29, 39)),
            (Gravity::West, (0, 19)),
            (Gravity::East, (59, 19)),
            (Gravity::NorthWest, (0, 0)),
            (Gravity::NorthEast, (59, 0)),
            (Gravity::SouthWest, (0, 39)),
            (Gravity::SouthEast, (59, 39)),
        ];
        for (gravity, expected) in cases {
            assert_eq!(
                gravity_origin(container, inner, gravity),
                expected,
                "{gravity}"
            );
        }
    }

    #[test]
    fn gravity_origin_saturates_when_inner_is_larger() {
        assert_eq!(
            gravity_origin(Size::new(10, 10), Size::new(11, 12), Gravity::SouthEast),
            (0, 0)
        );
    }

    // =========================================================================
    // plan_geometry tests
    // =========================================================================

    #[test]
    fn fit_letterboxes_wide_source() {
        let geometry =
            plan_geometry(Size::new(100, 100), dims(200, 100), Algo::Fit, Gravity::Center)
                .unwrap();
        assert_eq!(geometry.ratio(), 0.5);
        assert_eq!(geometry.placement(), Rect::new(0, 25, 100, 50));
        assert_eq!(geometry.output(), Size::new(100, 100));
        assert_eq!(geometry.intermediate(), None);
    }

    #[test]
    fn fit_gravity_south_east() {
        let geometry = plan_geometry(
            Size::new(100, 100),
            dims(200, 100),
            Algo::Fit,
            Gravity::SouthEast,
        )
        .unwrap();
        assert_eq!(geometry.placement(), Rect::new(0, 50, 100, 50));
    }

    #[test]
    fn fit_floors_placed_size() {
        // ratio = min(100/400, 100/302) = 0.25 → 302 * 0.25 = 75.5 → 75
        let geometry =
            plan_geometry(Size::new(100, 100), dims(400, 302), Algo::Fit, Gravity::Center)
                .unwrap();
        let rect = geometry.placement();
        assert_eq!((rect.width, rect.height), (100, 75));
        assert_eq!((rect.x, rect.y), (0, 12));
    }

    #[test]
    fn fill_crops_north_west() {
        let geometry = plan_geometry(
            Size::new(100, 100),
            dims(200, 100),
            Algo::Fill,
            Gravity::NorthWest,
        )
        .unwrap();
        assert_eq!(geometry.ratio(), 1.0);
        assert_eq!(geometry.intermediate(), Some(Size::new(200, 100)));
        assert_eq!(geometry.placement(), Rect::new(0, 0, 100, 100));
    }

    #[test]
    fn fill_crops_center() {
        let geometry =
            plan_geometry(Size::new(100, 100), dims(200, 100), Algo::Fill, Gravity::Center)
                .unwrap();
        assert_eq!(geometry.placement(), Rect::new(50, 0, 100, 100));
    }

    #[test]
    fn fill_covers_canvas() {
        // ratio = max(100/300, 100/200) = 0.5 → 150x100
        let geometry =
            plan_geometry(Size::new(100, 100), dims(300, 200), Algo::Fill, Gravity::East)
                .unwrap();
        assert_eq!(geometry.intermediate(), Some(Size::new(150, 100)));
        assert_eq!(geometry.placement(), Rect::new(50, 0, 100, 100));
    }

    #[test]
    fn fill_ceils_intermediate() {
        // ratio = max(4/8, 1/3) = 0.5 → 3 * 0.5 = 1.5 → 2
        let geometry =
            plan_geometry(Size::new(4, 1), dims(8, 3), Algo::Fill, Gravity::South).unwrap();
        assert_eq!(geometry.intermediate(), Some(Size::new(4, 2)));
        assert_eq!(geometry.placement(), Rect::new(0, 1, 4, 1));
    }

    #[test]
    fn zero_source_is_invalid() {
        let result = plan_geometry(Size::new(10, 10), dims(0, 10), Algo::Fit, Gravity::Center);
        assert!(matches!(result, Err(ResizeError::InvalidSourceFormat)));
        let result = plan_geometry(Size::new(10, 10), dims(10, 0), Algo::Fill, Gravity::Center);
        assert!(matches!(result, Err(ResizeError::InvalidSourceFormat)));
    }

    #[test]
    fn placement_contained_for_every_gravity_and_algo() {
        let sources = [(200, 100), (100, 200), (333, 777), (1, 1), (4000, 3)];
        let outputs = [(100, 100), (64, 48), (7, 300), (1, 1)];
        for &(sw, sh) in &sources {
            for &(ow, oh) in &outputs {
                for algo in [Algo::Fit, Algo::Fill] {
                    for gravity in Gravity::ALL {
                        let g = plan_geometry(Size::new(ow, oh), dims(sw, sh), algo, gravity)
                            .unwrap();
                        assert!(
                            g.placement().fits_within(g.container()),
                            "{algo} {gravity} src={sw}x{sh} out={ow}x{oh}: {g:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn scaled_axes_within_one_pixel_of_uniform_ratio() {
        let sources = [(200, 100), (333, 777), (1920, 1080)];
        let outputs = [(100, 100), (64, 48), (500, 20)];
        for &(sw, sh) in &sources {
            for &(ow, oh) in &outputs {
                for algo in [Algo::Fit, Algo::Fill] {
                    let g = plan_geometry(Size::new(ow, oh), dims(sw, sh), algo, Gravity::Center)
                        .unwrap();
                    let scaled = match g {
                        Geometry::Fit { placement, .. } => placement.size(),
                        Geometry::Fill { intermediate, .. } => intermediate,
                    };
                    let exact_w = sw as f64 * g.ratio();
                    let exact_h = sh as f64 * g.ratio();
                    assert!(
                        (scaled.width as f64 - exact_w).abs() < 1.0
                            && (scaled.height as f64 - exact_h).abs() < 1.0,
                        "{algo} src={sw}x{sh} out={ow}x{oh}: {scaled:?}"
                    );
                }
            }
        }
    }
}

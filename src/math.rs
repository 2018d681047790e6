/// Squared escape radius. `|z| > 2` is tested as `|z|² > 4`.
const ESCAPE_RADIUS_SQ: f32 = 4.0;

/// A point in the complex plane, laid out like a WGSL `vec2<f32>`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }

    fn norm_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }
}

/// Maps a pixel coordinate (bottom-left origin) to the plane:
/// `c = center + (pixel - resolution / 2) * scale`.
pub fn pixel_to_plane(pixel: Point, resolution: [f32; 2], center: Point, scale: f32) -> Point {
    Point {
        x: center.x + (pixel.x - resolution[0] / 2.0) * scale,
        y: center.y + (pixel.y - resolution[1] / 2.0) * scale,
    }
}

/// Counts iterations of `z <- z^2 + c` until `|z| > 2`.
///
/// Returns the 0-based index of the escaping iteration, or `max_iter` if the
/// orbit stays bounded. Same arithmetic as `fs_main` in `mandelbrot.wgsl`.
pub fn escape_time(c: Point, max_iter: u32) -> u32 {
    let mut z = Point::ORIGIN;

    for i in 0..max_iter {
        z = Point {
            x: z.x * z.x - z.y * z.y + c.x,
            y: 2.0 * z.x * z.y + c.y,
        };

        if z.norm_sq() > ESCAPE_RADIUS_SQ {
            return i;
        }
    }
    max_iter
}

/// Normalized greyscale intensity for an iteration count.
pub fn greyscale(iterations: u32, max_iter: u32) -> f32 {
    iterations as f32 / max_iter as f32
}

/// Full per-pixel evaluation: RGBA with the intensity on every colour channel.
pub fn shade_pixel(pixel: Point, resolution: [f32; 2], center: Point, scale: f32, max_iter: u32) -> [f32; 4] {
    let c = pixel_to_plane(pixel, resolution, center, scale);
    let v = greyscale(escape_time(c, max_iter), max_iter);
    [v, v, v, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    const RES: [f32; 2] = [800.0, 800.0];

    #[test]
    fn origin_never_escapes() {
        assert_eq!(escape_time(Point::ORIGIN, 10_000), 10_000);
        assert_eq!(greyscale(10_000, 10_000), 1.0);
    }

    #[test]
    fn far_point_escapes_on_first_iteration() {
        let c = Point::new(2.5, 0.0);
        assert_eq!(escape_time(c, 10_000), 0);

        let c = Point::new(-1.5, 1.6);
        assert_eq!(escape_time(c, 500), 0);
        assert_eq!(greyscale(0, 500), 0.0);
    }

    #[test]
    fn boundary_radius_is_exclusive() {
        // c = -2 stays at |z| = 2 forever.
        assert_eq!(escape_time(Point::new(-2.0, 0.0), 1000), 1000);
    }

    #[test]
    fn point_just_outside_escapes_later() {
        // c = 1: 1, 2, 5 -> escapes on the third update.
        assert_eq!(escape_time(Point::new(1.0, 0.0), 100), 2);
    }

    #[test]
    fn screen_center_maps_to_view_center() {
        let center = Point::new(-0.5, 0.0);
        let scale = 3.5 / 800.0;
        let c = pixel_to_plane(Point::new(400.0, 400.0), RES, center, scale);
        assert_eq!(c, center);
        assert_eq!(escape_time(c, 10_000), 10_000);
    }

    #[test]
    fn corners_span_the_framed_region() {
        let center = Point::new(-0.5, 0.0);
        let scale = 3.5 / 800.0;
        let bottom_left = pixel_to_plane(Point::ORIGIN, RES, center, scale);
        let top_right = pixel_to_plane(Point::new(800.0, 800.0), RES, center, scale);
        assert!((bottom_left.x - -2.25).abs() < 1e-6);
        assert!((bottom_left.y - -1.75).abs() < 1e-6);
        assert!((top_right.x - 1.25).abs() < 1e-6);
        assert!((top_right.y - 1.75).abs() < 1e-6);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let center = Point::new(-0.743, 0.131);
        let pixel = Point::new(123.5, 456.5);
        let a = shade_pixel(pixel, RES, center, 1e-4, 2000);
        let b = shade_pixel(pixel, RES, center, 1e-4, 2000);
        assert_eq!(a, b);
    }

    #[test]
    fn shade_is_grey_and_opaque() {
        let rgba = shade_pixel(Point::new(10.0, 700.0), RES, Point::new(-0.5, 0.0), 3.5 / 800.0, 64);
        assert_eq!(rgba[0], rgba[1]);
        assert_eq!(rgba[1], rgba[2]);
        assert_eq!(rgba[3], 1.0);
        assert!((0.0..=1.0).contains(&rgba[0]));
    }
}

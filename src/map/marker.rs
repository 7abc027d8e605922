use image::{Rgb, RgbImage};

pub const MARKER_COLOR: Rgb<u8> = Rgb([230, 30, 30]);
const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const MARKER_RADIUS: i64 = 7;
const OUTLINE_WIDTH: i64 = 2;

/// Filled red disc with a white ring, clipped to the image.
pub fn draw_marker(image: &mut RgbImage, center: (i64, i64)) {
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));
    let outer = MARKER_RADIUS + OUTLINE_WIDTH;

    for dy in -outer..=outer {
        for dx in -outer..=outer {
            let (x, y) = (center.0 + dx, center.1 + dy);
            if x < 0 || y < 0 || x >= width || y >= height {
                continue;
            }
            let distance = dx * dx + dy * dy;
            if distance <= MARKER_RADIUS * MARKER_RADIUS {
                image.put_pixel(x as u32, y as u32, MARKER_COLOR);
            } else if distance <= outer * outer {
                image.put_pixel(x as u32, y as u32, OUTLINE_COLOR);
            }
        }
    }
}

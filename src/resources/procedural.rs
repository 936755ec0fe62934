//! Textures generated in code instead of loaded from disk.
//!
//! Everything is produced as top-row-first pixel data, the same layout a
//! decoded image has, so it goes through the regular flipped upload.

use image::{Rgba, RgbaImage};

const W: [u8; 3] = [255, 255, 255];
const Y: [u8; 3] = [255, 255, 0];
const B: [u8; 3] = [0, 0, 0];

#[rustfmt::skip]
const SMILEY: [[[u8; 3]; 9]; 9] = [
    [W, W, W, Y, Y, Y, W, W, W],
    [W, W, Y, Y, Y, Y, Y, W, W],
    [W, Y, Y, Y, Y, Y, Y, Y, W],
    [Y, Y, B, Y, Y, Y, B, Y, Y],
    [Y, Y, B, Y, Y, Y, B, Y, Y],
    [Y, Y, Y, Y, Y, Y, Y, Y, Y],
    [W, Y, Y, B, B, B, Y, Y, W],
    [W, W, Y, Y, Y, Y, Y, W, W],
    [W, W, W, Y, Y, Y, W, W, W],
];

fn opaque([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// A 9x9 yellow smiley on white.
pub fn smiley() -> RgbaImage {
    RgbaImage::from_fn(9, 9, |x, y| opaque(SMILEY[y as usize][x as usize]))
}

/// 256x256 grayscale ramp, `(x + y) / 2` in every color channel.
pub fn gray_gradient() -> RgbaImage {
    RgbaImage::from_fn(256, 256, |x, y| {
        let v = ((x + y) / 2) as u8;
        opaque([v, v, v])
    })
}

/// 256x256 single-channel float ramp, `(x + y) / 512`, row-major.
pub fn float_gradient() -> (u32, u32, Vec<f32>) {
    const SIZE: u32 = 256;
    let data = (0..SIZE)
        .flat_map(|y| (0..SIZE).map(move |x| (x + y) as f32 / 512.0))
        .collect();
    (SIZE, SIZE, data)
}

/// Checkerboard of `size` pixels with `cell`-sized squares. The top-left cell
/// is `dark`.
pub fn checker(size: u32, cell: u32, dark: [u8; 3], light: [u8; 3]) -> RgbaImage {
    let cell = cell.max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            opaque(dark)
        } else {
            opaque(light)
        }
    })
}

pub fn white() -> RgbaImage {
    RgbaImage::from_pixel(1, 1, opaque(W))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smiley_has_eyes_and_white_corners() {
        let img = smiley();
        assert_eq!(img.dimensions(), (9, 9));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(2, 3), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(6, 4), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(4, 0), &Rgba([255, 255, 0, 255]));
    }

    #[test]
    fn gray_gradient_runs_from_black_to_white() {
        let img = gray_gradient();
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(255, 255), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(10, 20).0[0], 15);
    }

    #[test]
    fn float_gradient_stays_below_one() {
        let (w, h, data) = float_gradient();
        assert_eq!(data.len(), (w * h) as usize);
        assert_eq!(data[0], 0.0);
        assert_eq!(data[(w * h - 1) as usize], 510.0 / 512.0);
        assert_eq!(data[3 + 2 * w as usize], 5.0 / 512.0);
    }

    #[test]
    fn checker_alternates_per_cell() {
        let img = checker(1024, 256, [127; 3], [255; 3]);
        assert_eq!(img.get_pixel(0, 0).0, [127, 127, 127, 255]);
        assert_eq!(img.get_pixel(255, 0).0, [127, 127, 127, 255]);
        assert_eq!(img.get_pixel(256, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(256, 256).0, [127, 127, 127, 255]);
    }

    #[test]
    fn white_is_a_single_opaque_texel() {
        let img = white();
        assert_eq!(img.dimensions(), (1, 1));
        assert_eq!(img.get_pixel(0, 0).0, [255; 4]);
    }
}

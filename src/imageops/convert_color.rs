/// Swaps the first and third channel of every packed 3-channel pixel, in place.
///
/// The operation is its own inverse, so it converts BGR to RGB and back.
pub fn swap_red_blue(pixels: &mut [u8]) {
    for pixel in pixels.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }
}

/// Writes `src` into `dst` with the first and third channel swapped.
///
/// Both buffers hold packed 3-channel pixels; only the common prefix is
/// converted.
pub fn bgr_to_rgb_into(src: &[u8], dst: &mut [u8]) {
    for (to, from) in dst.chunks_exact_mut(3).zip(src.chunks_exact(3)) {
        to[0] = from[2];
        to[1] = from[1];
        to[2] = from[0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_red_blue() {
        let mut pixels = [1, 2, 3, 4, 5, 6];
        swap_red_blue(&mut pixels);
        assert_eq!(pixels, [3, 2, 1, 6, 5, 4]);
        swap_red_blue(&mut pixels);
        assert_eq!(pixels, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_swap_ignores_trailing_bytes() {
        let mut pixels = [1, 2, 3, 9];
        swap_red_blue(&mut pixels);
        assert_eq!(pixels, [3, 2, 1, 9]);
    }

    #[test]
    fn test_bgr_to_rgb_into() {
        let bgr = [255, 0, 10, 1, 2, 3];
        let mut rgb = [0u8; 6];
        bgr_to_rgb_into(&bgr, &mut rgb);
        assert_eq!(rgb, [10, 0, 255, 3, 2, 1]);
    }
}

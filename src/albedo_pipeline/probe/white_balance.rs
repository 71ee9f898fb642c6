use image::Rgb32FImage;
use tracing::warn;

/// Per-channel multipliers anchored on green (`coeffs[1] == 1.0`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhiteBalance {
    pub coeffs: [f32; 3],
}

impl WhiteBalance {
    pub fn identity() -> Self {
        Self { coeffs: [1.0; 3] }
    }

    /// Derives coefficients that map the reference color to neutral gray.
    ///
    /// A non-positive median component would make the ratio undefined or
    /// zero, so the affected coefficient falls back to 1.0 (both of them if
    /// green is the culprit).
    pub fn from_reference(reference: [f32; 3]) -> Self {
        let [r, g, b] = reference;

        if g.is_nan() || g <= 0.0 {
            warn!("Probe median green is {}, leaving red and blue unscaled", g);
            return Self::identity();
        }

        let ratio = |channel: f32, name: &str| {
            if channel > 0.0 {
                g / channel
            } else {
                warn!("Probe median {} is {}, using coefficient 1.0", name, channel);
                1.0
            }
        };

        Self {
            coeffs: [ratio(r, "red"), 1.0, ratio(b, "blue")],
        }
    }

    pub fn red(&self) -> f32 {
        self.coeffs[0]
    }

    pub fn green(&self) -> f32 {
        self.coeffs[1]
    }

    pub fn blue(&self) -> f32 {
        self.coeffs[2]
    }

    /// Scales every pixel channel-wise. No clipping is done here.
    pub fn apply(&self, image: &Rgb32FImage) -> Rgb32FImage {
        let mut balanced = image.clone();
        for pixel in balanced.pixels_mut() {
            for (value, coeff) in pixel.0.iter_mut().zip(self.coeffs) {
                *value *= coeff;
            }
        }
        balanced
    }
}

impl Default for WhiteBalance {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_green_anchored_ratios() {
        let wb = WhiteBalance::from_reference([0.25, 0.5, 1.0]);
        assert_eq!(wb.coeffs, [2.0, 1.0, 0.5]);
    }

    #[test]
    fn test_zero_components_fall_back() {
        let wb = WhiteBalance::from_reference([0.0, 0.5, 0.25]);
        assert_eq!(wb.coeffs, [1.0, 1.0, 2.0]);

        let wb = WhiteBalance::from_reference([0.3, 0.0, 0.2]);
        assert_eq!(wb, WhiteBalance::identity());
    }

    #[test]
    fn test_apply_scales_channels() {
        let image = Rgb32FImage::from_pixel(2, 2, Rgb([1.0, 2.0, 3.0]));
        let wb = WhiteBalance { coeffs: [2.0, 1.0, 0.5] };
        let balanced = wb.apply(&image);
        assert!(balanced.pixels().all(|p| p.0 == [2.0, 2.0, 1.5]));
    }
}

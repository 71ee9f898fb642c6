use image::Rgb32FImage;
use tracing::debug;

use crate::albedo_pipeline::common::median_in_place;
use crate::albedo_pipeline::probe::mask::{ProbeParams, valid_pixel_mask};
use crate::albedo_pipeline::probe::white_balance::WhiteBalance;

/// Outcome of analyzing one light probe capture
#[derive(Debug, Clone, Copy)]
pub struct ProbeAnalysis {
    /// Number of probe pixels that survived the erosion
    pub valid_pixels: usize,
    /// Per-channel median over the valid pixels
    pub median: [f32; 3],
    pub white_balance: WhiteBalance,
}

#[derive(Debug, Clone, Default)]
pub struct ProbeAnalyzer {
    params: ProbeParams,
}

impl ProbeAnalyzer {
    pub fn new(params: ProbeParams) -> Self {
        Self { params }
    }

    /// Estimates white balance from the probe's eroded valid region.
    ///
    /// Returns `None` when no pixel survives the erosion.
    pub fn analyze(&self, probe: &Rgb32FImage) -> Option<ProbeAnalysis> {
        let mask = valid_pixel_mask(probe, &self.params);

        let mut channels: [Vec<f32>; 3] = Default::default();
        for (pixel, flag) in probe.pixels().zip(mask.pixels()) {
            if flag.0[0] == 0 {
                continue;
            }
            for (samples, &value) in channels.iter_mut().zip(pixel.0.iter()) {
                samples.push(value);
            }
        }

        let valid_pixels = channels[0].len();
        if valid_pixels == 0 {
            return None;
        }

        let mut median = [0.0f32; 3];
        for (out, samples) in median.iter_mut().zip(channels.iter_mut()) {
            *out = median_in_place(samples)?;
        }

        let white_balance = WhiteBalance::from_reference(median);
        debug!(
            valid_pixels,
            median = ?median,
            coeffs = ?white_balance.coeffs,
            "Probe analyzed"
        );

        Some(ProbeAnalysis {
            valid_pixels,
            median,
            white_balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_neutral_probe_is_noop() {
        let probe = Rgb32FImage::from_pixel(50, 50, Rgb([0.5, 0.5, 0.5]));
        let analysis = ProbeAnalyzer::default().analyze(&probe).unwrap();

        assert_eq!(analysis.white_balance.coeffs, [1.0, 1.0, 1.0]);
        assert_eq!(analysis.valid_pixels, 40 * 40);
    }

    #[test]
    fn test_tinted_probe_coefficients() {
        let probe = Rgb32FImage::from_pixel(32, 32, Rgb([0.8, 0.4, 0.2]));
        let analysis = ProbeAnalyzer::default().analyze(&probe).unwrap();
        let wb = analysis.white_balance;

        assert_eq!(wb.green(), 1.0);
        assert!((wb.red() - 0.5).abs() < 1e-6);
        assert!((wb.blue() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_median_ignores_outlier_highlights() {
        let mut probe = Rgb32FImage::from_pixel(32, 32, Rgb([0.3, 0.6, 0.6]));
        for x in 10..14 {
            probe.put_pixel(x, 16, Rgb([50.0, 0.6, 0.6]));
        }
        let analysis = ProbeAnalyzer::default().analyze(&probe).unwrap();

        assert_eq!(analysis.median, [0.3, 0.6, 0.6]);
        assert!((analysis.white_balance.red() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_dark_probe_is_degenerate() {
        let probe = Rgb32FImage::from_pixel(32, 32, Rgb([0.001, 0.001, 0.001]));
        assert!(ProbeAnalyzer::default().analyze(&probe).is_none());
    }

    #[test]
    fn test_coefficients_positive_for_any_valid_probe() {
        let probe = Rgb32FImage::from_pixel(24, 24, Rgb([0.9, 0.0, 0.0]));
        let wb = ProbeAnalyzer::default().analyze(&probe).unwrap().white_balance;

        assert_eq!(wb.green(), 1.0);
        assert!(wb.red() > 0.0 && wb.blue() > 0.0);
    }
}

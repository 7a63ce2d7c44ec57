use crate::dsp::FilterMode;
use crate::fixed::{fix_cos, fix_div, fix_sin, u8_to_fix, FIX_1, FIX_PI, FIX_SHIFT};

/*
Biquad coefficient derivation, after the Audio EQ Cookbook by
Robert Bristow-Johnson (http://www.musicdsp.org/files/Audio-EQ-Cookbook.txt).

    w0    = 2*pi*freq / sample_rate
    alpha = sin(w0) / Q

with the per-mode {b0,b1,b2,a0,a1,a2} sets below. The resonance parameter
maps to Q as `2*res + 0.1`; the 0.1 floor keeps the division away from zero
at res = 0. All coefficients are divided by a0 once here, so the per-sample
recurrence needs no division:

    out = b0*in + b1*in1 + b2*in2 - a1*out1 - a2*out2

`amp` is a small per-mode makeup gain (applied as x*amp >> 8) that evens out
the passband level differences between the four responses.
*/

/// Normalized Q13 coefficients plus the mode's makeup gain.
#[derive(Debug, Clone, Copy)]
pub struct Coefficients {
    pub b0: i32,
    pub b1: i32,
    pub b2: i32,
    pub a1: i32,
    pub a2: i32,
    pub amp: i32,
}

impl Coefficients {
    pub fn derive(mode: FilterMode, freq: i32, res: i32, sample_rate: i32) -> Self {
        let w0 = ((2 * FIX_PI as i64 * freq as i64) / sample_rate as i64) as i32;
        let cos_w0 = fix_cos(w0);
        let sin_w0 = fix_sin(w0);
        let q = 2 * u8_to_fix(res) + FIX_1 / 10;
        let alpha = fix_div(sin_w0, q);

        let a0 = FIX_1 + alpha;
        let a1 = -2 * cos_w0;
        let a2 = FIX_1 - alpha;

        let (b0, b1, b2, amp) = match mode {
            FilterMode::LowPass => {
                let b = (FIX_1 - cos_w0) / 2;
                (b, FIX_1 - cos_w0, b, 200)
            }
            FilterMode::HighPass => {
                let b = (FIX_1 + cos_w0) / 2;
                (b, -(FIX_1 + cos_w0), b, 200 + (freq >> 5))
            }
            FilterMode::BandPass => (sin_w0 / 2, 0, -sin_w0 / 2, 255 + (freq >> 5)),
            FilterMode::Notch => (FIX_1, -2 * cos_w0, FIX_1, 200),
        };

        Self {
            b0: fix_div(b0, a0),
            b1: fix_div(b1, a0),
            b2: fix_div(b2, a0),
            a1: fix_div(a1, a0),
            a2: fix_div(a2, a0),
            amp,
        }
    }
}

/// One second-order section: the previous two inputs and outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Section {
    in1: i32,
    in2: i32,
    out1: i32,
    out2: i32,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the recurrence by one sample.
    ///
    /// Accumulates in 64 bits and shifts back once, so intermediate products
    /// cannot overflow.
    #[inline]
    pub fn run(&mut self, c: &Coefficients, input: i32) -> i32 {
        let mut acc = c.b0 as i64 * input as i64;
        acc += c.b1 as i64 * self.in1 as i64;
        acc += c.b2 as i64 * self.in2 as i64;
        acc -= c.a1 as i64 * self.out1 as i64;
        acc -= c.a2 as i64 * self.out2 as i64;
        let output = (acc >> FIX_SHIFT) as i32;
        self.in2 = self.in1;
        self.in1 = input;
        self.out2 = self.out1;
        self.out1 = output;
        output
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// f64 mirror of `Coefficients::derive` for the lowpass case, straight
    /// from the cookbook.
    fn reference_lowpass(freq: f64, res: f64, sample_rate: f64) -> (f64, f64, f64, f64, f64) {
        let w0 = 2.0 * std::f64::consts::PI * freq / sample_rate;
        let q = 2.0 * res / 256.0 + 0.1;
        let alpha = w0.sin() / q;
        let a0 = 1.0 + alpha;
        let b0 = (1.0 - w0.cos()) / 2.0;
        let b1 = 1.0 - w0.cos();
        (
            b0 / a0,
            b1 / a0,
            b0 / a0,
            -2.0 * w0.cos() / a0,
            (1.0 - alpha) / a0,
        )
    }

    fn to_f64(x: i32) -> f64 {
        x as f64 / FIX_1 as f64
    }

    #[test]
    fn lowpass_coefficients_match_reference() {
        let c = Coefficients::derive(FilterMode::LowPass, 1000, 0, 44100);
        let (b0, b1, b2, a1, a2) = reference_lowpass(1000.0, 0.0, 44100.0);
        // Q13 quantization of the small numerator terms dominates the error.
        assert!((to_f64(c.b0) - b0).abs() < 0.002, "b0 {} vs {}", to_f64(c.b0), b0);
        assert!((to_f64(c.b1) - b1).abs() < 0.002, "b1 {} vs {}", to_f64(c.b1), b1);
        assert!((to_f64(c.b2) - b2).abs() < 0.002, "b2 {} vs {}", to_f64(c.b2), b2);
        assert!((to_f64(c.a1) - a1).abs() < 0.01, "a1 {} vs {}", to_f64(c.a1), a1);
        assert!((to_f64(c.a2) - a2).abs() < 0.01, "a2 {} vs {}", to_f64(c.a2), a2);
    }

    #[test]
    fn dc_passes_through_lowpass() {
        let c = Coefficients::derive(FilterMode::LowPass, 1000, 128, 44100);
        let mut section = Section::new();
        let mut out = 0;
        for _ in 0..50_000 {
            out = section.run(&c, 10_000);
        }
        // Settles near the input level (DC gain ~1 before makeup gain).
        assert!((out - 10_000).abs() < 1_000, "settled at {}", out);
    }

    #[test]
    fn section_stays_bounded_on_square_wave() {
        for &res in &[0, 128, 255] {
            for &freq in &[100, 1000, 10_000, 22_050] {
                let c = Coefficients::derive(FilterMode::LowPass, freq, res, 44100);
                let mut section = Section::new();
                let mut peak: i64 = 0;
                for i in 0..100_000u32 {
                    let x = if (i / 50) % 2 == 0 { 32_767 } else { -32_768 };
                    let y = section.run(&c, x) as i64;
                    peak = peak.max(y.abs());
                }
                // A stable section never runs away; allow resonant overshoot.
                assert!(
                    peak < 1 << 20,
                    "freq {} res {} peaked at {}",
                    freq,
                    res,
                    peak
                );
            }
        }
    }

    #[test]
    fn reset_clears_history() {
        let c = Coefficients::derive(FilterMode::HighPass, 5000, 100, 48000);
        let mut section = Section::new();
        for _ in 0..64 {
            section.run(&c, 20_000);
        }
        section.reset();
        assert_eq!(section.run(&c, 0), 0);
    }
}

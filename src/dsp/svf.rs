use crate::dsp::FilterMode;
use crate::fixed::{fix_mul, fix_sin, u8_to_fix, FIX_PI};

/*
Chamberlin state-variable filter. One set of running state produces all
four responses at once:

    lp += f * bp
    hp  = in - lp - q * bp
    bp += f * hp
    n   = hp + lp

The loop runs twice per sample for a steeper slope, averaging the selected
output across the two iterations. The topology is only stable well below
sample_rate / 3, which is why the owning unit caps the cutoff at 10 kHz.
*/

/// Tune the frequency coefficient: `2 * sin(pi * freq / (2 * sample_rate))`.
pub fn tune_freq(freq: i32, sample_rate: i32) -> i32 {
    2 * fix_sin(((FIX_PI as i64 * freq as i64) / (2 * sample_rate) as i64) as i32)
}

/// Tune the damping coefficient from a 0..=255 resonance amount.
///
/// The raw mapping is too aggressive at the top of the range, so an eighth
/// is taken back off before inverting.
pub fn tune_res(res: i32) -> i32 {
    let res = res - res / 8;
    2 * u8_to_fix(255 - res)
}

/// Running state for one channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvfState {
    pub lp: i32,
    pub hp: i32,
    pub bp: i32,
    pub notch: i32,
}

impl SvfState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one sample: two iterations, every state always updated, the
    /// mode only selects which state is read.
    #[inline]
    pub fn run(&mut self, f: i32, q: i32, mode: FilterMode, input: i32) -> i32 {
        let mut output = 0;
        for _ in 0..2 {
            self.lp += fix_mul(f, self.bp);
            self.hp = input - self.lp - fix_mul(q, self.bp);
            self.bp += fix_mul(f, self.hp);
            self.notch = self.hp + self.lp;
            let selected = match mode {
                FilterMode::LowPass => self.lp,
                FilterMode::HighPass => self.hp,
                FilterMode::BandPass => self.bp,
                FilterMode::Notch => self.notch,
            };
            output += selected / 2;
        }
        output
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

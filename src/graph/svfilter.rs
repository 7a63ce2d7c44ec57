use crate::clip;
use crate::context::AudioContext;
use crate::dsp::svf::{tune_freq, tune_res, SvfState};
use crate::dsp::FilterMode;
use crate::graph::params::ParamSpec;
use crate::graph::unit::{Processor, UnitKind};

/// State-variable filter unit.
///
/// Cleaner sound than the biquad, but the topology goes unstable
/// approaching a third of the sample rate, so the cutoff is hard-capped at
/// 10 kHz. Tuned coefficients are rederived in the setters.
pub struct SvFilter {
    vol: i32,
    mode: FilterMode,
    freq: i32,
    res: i32,
    tuned_freq: i32,
    tuned_res: i32,
    left: SvfState,
    right: SvfState,
}

const PARAMS: [ParamSpec; 4] = [
    ParamSpec::new("vol", 0, 255),
    ParamSpec::new("mode", 0, 3),
    ParamSpec::new("freq", 0, 10000),
    ParamSpec::new("res", 0, 255),
];

impl SvFilter {
    pub const VOL: usize = 0;
    pub const MODE: usize = 1;
    pub const FREQ: usize = 2;
    pub const RES: usize = 3;

    pub fn new(context: &AudioContext) -> Self {
        let freq = 7000;
        let res = 0;
        Self {
            vol: 255,
            mode: FilterMode::LowPass,
            freq,
            res,
            tuned_freq: tune_freq(freq, context.sample_rate),
            tuned_res: tune_res(res),
            left: SvfState::new(),
            right: SvfState::new(),
        }
    }
}

impl Processor for SvFilter {
    fn name(&self) -> &'static str {
        "svfilter"
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn get(&self, param_id: usize) -> i32 {
        match param_id {
            Self::VOL => self.vol,
            Self::MODE => self.mode.raw(),
            Self::FREQ => self.freq,
            Self::RES => self.res,
            _ => 0,
        }
    }

    fn set(&mut self, context: &AudioContext, param_id: usize, value: i32) {
        match param_id {
            Self::VOL => self.vol = PARAMS[Self::VOL].clamp(value),
            Self::MODE => self.mode = FilterMode::from_raw(value),
            Self::FREQ => {
                self.freq = PARAMS[Self::FREQ].clamp(value);
                self.tuned_freq = tune_freq(self.freq, context.sample_rate);
            }
            Self::RES => {
                self.res = PARAMS[Self::RES].clamp(value);
                self.tuned_res = tune_res(self.res);
            }
            _ => {}
        }
    }

    fn process(&mut self, _context: &AudioContext, buffer: &mut [i16]) {
        let (f, q, mode, vol) = (self.tuned_freq, self.tuned_res, self.mode, self.vol);
        for frame in buffer.chunks_exact_mut(2) {
            let l = self.left.run(f, q, mode, frame[0] as i32);
            frame[0] = clip(l * vol >> 8);
            let r = self.right.run(f, q, mode, frame[1] as i32);
            frame[1] = clip(r * vol >> 8);
        }
    }
}

impl From<SvFilter> for UnitKind {
    fn from(filter: SvFilter) -> Self {
        UnitKind::SvFilter(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AudioContext {
        AudioContext::new(44100)
    }

    fn sine_frames(freq: f64, frames: usize, amplitude: f64) -> Vec<i16> {
        let mut buffer = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            let s = (2.0 * std::f64::consts::PI * freq * i as f64 / 44100.0).sin();
            let s = (s * amplitude) as i16;
            buffer.push(s);
            buffer.push(s);
        }
        buffer
    }

    fn rms_left(buffer: &[i16]) -> f64 {
        let frames: Vec<_> = buffer.chunks_exact(2).skip(buffer.len() / 8).collect();
        let sum: f64 = frames.iter().map(|f| (f[0] as f64).powi(2)).sum();
        (sum / frames.len() as f64).sqrt()
    }

    #[test]
    fn frequency_is_hard_capped() {
        let ctx = ctx();
        let mut filter = SvFilter::new(&ctx);
        filter.set(&ctx, SvFilter::FREQ, 22050);
        assert_eq!(filter.get(SvFilter::FREQ), 10000);
    }

    #[test]
    fn defaults_expose_the_contract_table() {
        let ctx = ctx();
        let filter = SvFilter::new(&ctx);
        assert_eq!(filter.get(SvFilter::VOL), 255);
        assert_eq!(filter.get(SvFilter::MODE), 0);
        assert_eq!(filter.get(SvFilter::FREQ), 7000);
        assert_eq!(filter.get(SvFilter::RES), 0);
    }

    #[test]
    fn silence_in_silence_out() {
        let ctx = ctx();
        let mut filter = SvFilter::new(&ctx);
        let mut buffer = vec![0i16; 512];
        filter.process(&ctx, &mut buffer);
        assert!(buffer.iter().all(|&s| s == 0));
    }

    #[test]
    fn lowpass_separates_bands() {
        let ctx = ctx();
        let mut filter = SvFilter::new(&ctx);
        filter.set(&ctx, SvFilter::FREQ, 1000);

        let mut pass = sine_frames(100.0, 4096, 28_000.0);
        filter.process(&ctx, &mut pass);
        let pass_rms = rms_left(&pass);

        let mut filter = SvFilter::new(&ctx);
        filter.set(&ctx, SvFilter::FREQ, 1000);
        let mut stop = sine_frames(8000.0, 4096, 28_000.0);
        filter.process(&ctx, &mut stop);
        let stop_rms = rms_left(&stop);

        assert!(
            pass_rms > 8.0 * stop_rms,
            "pass {} vs stop {}",
            pass_rms,
            stop_rms
        );
    }

    #[test]
    fn mode_switch_rebinds_the_read_not_the_state() {
        let ctx = ctx();
        let mut filter = SvFilter::new(&ctx);
        filter.set(&ctx, SvFilter::FREQ, 1000);

        // Run lowpass for a while, then flip to highpass mid-stream: the
        // running state carries over, no retune happens, and the output
        // immediately reads the other state variable.
        let mut buffer = sine_frames(100.0, 2048, 20_000.0);
        filter.process(&ctx, &mut buffer);
        let low_rms = rms_left(&buffer);

        filter.set(&ctx, SvFilter::MODE, 1);
        let mut buffer = sine_frames(100.0, 2048, 20_000.0);
        filter.process(&ctx, &mut buffer);
        let high_rms = rms_left(&buffer);

        // 100 Hz through a 1 kHz highpass mostly disappears.
        assert!(
            low_rms > 8.0 * high_rms,
            "low {} vs high {}",
            low_rms,
            high_rms
        );
    }

    #[test]
    fn stays_bounded_at_the_cap_with_full_resonance() {
        let ctx = ctx();
        let mut filter = SvFilter::new(&ctx);
        filter.set(&ctx, SvFilter::FREQ, 10000);
        filter.set(&ctx, SvFilter::RES, 255);

        let mut buffer = vec![0i16; 2048];
        for block in 0..50 {
            for (i, s) in buffer.iter_mut().enumerate() {
                *s = if ((block * 2048 + i) / 64) % 2 == 0 {
                    i16::MAX
                } else {
                    i16::MIN
                };
            }
            filter.process(&ctx, &mut buffer);
        }

        let mut tail = vec![0i16; 2048];
        for _ in 0..20 {
            tail.fill(0);
            filter.process(&ctx, &mut tail);
        }
        let peak = tail.iter().map(|&s| (s as i32).abs()).max().unwrap();
        assert!(peak < 1024, "still ringing at {}", peak);
    }
}

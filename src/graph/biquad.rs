use crate::clip;
use crate::context::AudioContext;
use crate::dsp::biquad::{Coefficients, Section};
use crate::dsp::FilterMode;
use crate::graph::params::ParamSpec;
use crate::graph::unit::{Processor, UnitKind};

/// Biquad filter unit: two cascaded cookbook sections per channel for a
/// steeper rolloff.
///
/// More stable than the state-variable topology and usable at any sample
/// rate; the cutoff ranges over the full 100..=22050 Hz band. Coefficients
/// are rederived inside the setters, never per sample.
pub struct BiquadFilter {
    vol: i32,
    mode: FilterMode,
    freq: i32,
    res: i32,
    coefficients: Coefficients,
    left: [Section; 2],
    right: [Section; 2],
}

const PARAMS: [ParamSpec; 4] = [
    ParamSpec::new("vol", 0, 255),
    ParamSpec::new("mode", 0, 3),
    ParamSpec::new("freq", 100, 22050),
    ParamSpec::new("res", 0, 255),
];

impl BiquadFilter {
    pub const VOL: usize = 0;
    pub const MODE: usize = 1;
    pub const FREQ: usize = 2;
    pub const RES: usize = 3;

    pub fn new(context: &AudioContext) -> Self {
        let mode = FilterMode::LowPass;
        let freq = 22050;
        let res = 0;
        Self {
            vol: 255,
            mode,
            freq,
            res,
            coefficients: Coefficients::derive(mode, freq, res, context.sample_rate),
            left: [Section::new(); 2],
            right: [Section::new(); 2],
        }
    }

    fn retune(&mut self, context: &AudioContext) {
        self.coefficients = Coefficients::derive(self.mode, self.freq, self.res, context.sample_rate);
    }

    #[inline]
    fn run_channel(sections: &mut [Section; 2], c: &Coefficients, sample: i32) -> i32 {
        let mut x = sample * c.amp >> 8;
        for section in sections.iter_mut() {
            x = section.run(c, x);
        }
        x
    }
}

impl Processor for BiquadFilter {
    fn name(&self) -> &'static str {
        "filter"
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
            Self::MODE => {
                self.mode = FilterMode::from_raw(value);
                self.retune(context);
            }
            Self::FREQ => {
                self.freq = PARAMS[Self::FREQ].clamp(value);
                self.retune(context);
            }
            Self::RES => {
                self.res = PARAMS[Self::RES].clamp(value);
                self.retune(context);
            }
            _ => {}
        }
    }

    fn process(&mut self, _context: &AudioContext, buffer: &mut [i16]) {
        let c = self.coefficients;
        for frame in buffer.chunks_exact_mut(2) {
            let l = frame[0] as i32 * self.vol >> 8;
            frame[0] = clip(Self::run_channel(&mut self.left, &c, l));
            let r = frame[1] as i32 * self.vol >> 8;
            frame[1] = clip(Self::run_channel(&mut self.right, &c, r));
        }
    }
}

impl From<BiquadFilter> for UnitKind {
    fn from(filter: BiquadFilter) -> Self {
        UnitKind::Filter(filter)
    }
}

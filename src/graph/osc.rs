use crate::clip;
use crate::context::AudioContext;
use crate::dsp::wave::{Noise, Waveform};
use crate::fixed::{u8_to_fix, FIX_1, FIX_SHIFT};
use crate::graph::params::ParamSpec;
use crate::graph::unit::{Processor, UnitKind};

/// Oscillator unit.
///
/// Unlike the filters and the delay this is an additive source: the
/// generated waveform is mixed into the incoming stream rather than
/// replacing it, so an oscillator at the head of a chain contributes its
/// tone on top of whatever (usually silence) arrives. One mono phase
/// accumulator is shared by both channels and advances once per frame.
/// While inactive the unit leaves the buffer untouched.
pub struct Osc {
    active: bool,
    vol: i32,
    freq: i32,
    wave: Waveform,
    phase: i32,
    noise: Noise,
}

const PARAMS: [ParamSpec; 4] = [
    ParamSpec::new("active", 0, 1),
    ParamSpec::new("vol", 0, 255),
    ParamSpec::new("freq", 50, 20000),
    ParamSpec::new("wave", 0, 4),
];

impl Osc {
    pub const ACTIVE: usize = 0;
    pub const VOL: usize = 1;
    pub const FREQ: usize = 2;
    pub const WAVE: usize = 3;

    pub fn new() -> Self {
        Self {
            active: false,
            vol: 128,
            freq: 440,
            wave: Waveform::Saw,
            phase: 0,
            noise: Noise::new(),
        }
    }

    /// Phase increment in Q13 cycles per sample.
    fn increment(&self, context: &AudioContext) -> i32 {
        (((self.freq as i64) << FIX_SHIFT) / context.sample_rate as i64) as i32
    }
}

impl Default for Osc {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for Osc {
    fn name(&self) -> &'static str {
        "osc"
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn get(&self, param_id: usize) -> i32 {
        match param_id {
            Self::ACTIVE => self.active as i32,
            Self::VOL => self.vol,
            Self::FREQ => self.freq,
            Self::WAVE => self.wave.raw(),
            _ => 0,
        }
    }

    fn set(&mut self, _context: &AudioContext, param_id: usize, value: i32) {
        match param_id {
            Self::ACTIVE => self.active = PARAMS[Self::ACTIVE].clamp(value) != 0,
            Self::VOL => self.vol = PARAMS[Self::VOL].clamp(value),
            Self::FREQ => self.freq = PARAMS[Self::FREQ].clamp(value),
            Self::WAVE => self.wave = Waveform::from_raw(value),
            _ => {}
        }
    }

    fn process(&mut self, context: &AudioContext, buffer: &mut [i16]) {
        if !self.active {
            return;
        }
        let amp = u8_to_fix(self.vol);
        let increment = self.increment(context);
        for frame in buffer.chunks_exact_mut(2) {
            // Waveforms are ±FIX_1; shift up to the 16-bit sample range.
            let generated = self.wave.eval(self.phase, &mut self.noise) << 2;
            self.phase = (self.phase + increment) & (FIX_1 - 1);
            for sample in frame.iter_mut() {
                let mixed = (*sample as i32 + generated) as i64 * amp as i64;
                *sample = clip((mixed >> FIX_SHIFT) as i32);
            }
        }
    }
}

impl From<Osc> for UnitKind {
    fn from(osc: Osc) -> Self {
        UnitKind::Osc(osc)
    }
}

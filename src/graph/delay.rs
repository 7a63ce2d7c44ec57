use crate::clip;
use crate::context::AudioContext;
use crate::dsp::delay::DelayBuffer;
use crate::graph::params::ParamSpec;
use crate::graph::unit::{Processor, UnitKind};
use crate::MAX_DELAY_SECS;

/// Delay/echo unit.
///
/// `time` is in 1/256ths of a second (so 256 is one second), capped at four
/// seconds. The only unit kind with owned heap buffers: both channels get a
/// circular line sized for the maximum delay at the context's sample rate,
/// allocated at construction and released on drop.
pub struct Delay {
    dry: i32,
    wet: i32,
    feedback: i32,
    time: i32,
    left: DelayBuffer,
    right: DelayBuffer,
}

const PARAMS: [ParamSpec; 4] = [
    ParamSpec::new("dry", 0, 255),
    ParamSpec::new("wet", 0, 255),
    ParamSpec::new("feedback", 0, 255),
    ParamSpec::new("time", 1, MAX_DELAY_SECS as i32 * 256 - 1),
];

impl Delay {
    pub const DRY: usize = 0;
    pub const WET: usize = 1;
    pub const FEEDBACK: usize = 2;
    pub const TIME: usize = 3;

    pub fn new(context: &AudioContext) -> Self {
        // The max read offset is (1023 * sample_rate) >> 8, just under the
        // buffer size, so one wraparound correction always lands in range.
        let size = MAX_DELAY_SECS * context.sample_rate as usize;
        Self {
            dry: 255,
            wet: 127,
            feedback: 100,
            time: 127,
            left: DelayBuffer::new(size),
            right: DelayBuffer::new(size),
        }
    }

    fn offset(&self, context: &AudioContext) -> usize {
        let offset = (self.time as i64 * context.sample_rate as i64 >> 8) as usize;
        offset.min(self.left.len() - 1)
    }
}

impl Processor for Delay {
    fn name(&self) -> &'static str {
        "delay"
    }

    fn params(&self) -> &'static [ParamSpec] {
        &PARAMS
    }

    fn get(&self, param_id: usize) -> i32 {
        match param_id {
            Self::DRY => self.dry,
            Self::WET => self.wet,
            Self::FEEDBACK => self.feedback,
            Self::TIME => self.time,
            _ => 0,
        }
    }

    fn set(&mut self, _context: &AudioContext, param_id: usize, value: i32) {
        match param_id {
            Self::DRY => self.dry = PARAMS[Self::DRY].clamp(value),
            Self::WET => self.wet = PARAMS[Self::WET].clamp(value),
            Self::FEEDBACK => self.feedback = PARAMS[Self::FEEDBACK].clamp(value),
            Self::TIME => self.time = PARAMS[Self::TIME].clamp(value),
            _ => {}
        }
    }

    fn process(&mut self, context: &AudioContext, buffer: &mut [i16]) {
        let offset = self.offset(context);
        let (dry, wet, feedback) = (self.dry, self.wet, self.feedback);
        for frame in buffer.chunks_exact_mut(2) {
            let input = frame[0] as i32;
            let delayed = self.left.run(input, offset, feedback);
            frame[0] = clip((input * dry >> 8) + (delayed * wet >> 8));

            let input = frame[1] as i32;
            let delayed = self.right.run(input, offset, feedback);
            frame[1] = clip((input * dry >> 8) + (delayed * wet >> 8));
        }
    }
}

impl From<Delay> for UnitKind {
    fn from(delay: Delay) -> Self {
        UnitKind::Delay(delay)
    }
}

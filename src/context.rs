//! Engine-wide timing shared by every unit in a graph.

/// Sample-rate and tempo information for one engine instance.
///
/// The sample rate is fixed for the context's lifetime; all frequency-domain
/// math in the unit kinds derives from it. The tempo fields exist for a
/// tracker-style tick scheduler layered on top of the engine and are not
/// read by block processing itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioContext {
    pub sample_rate: i32,
    pub tempo: i32,
    pub ticks_per_line: i32,
    pub samples_per_tick: i32,
}

impl AudioContext {
    /// Create a context at the given sample rate with default tracker timing
    /// (120 BPM, 6 ticks per line, 4 lines per beat).
    ///
    /// # Panics
    ///
    /// Panics if `sample_rate` is not positive.
    pub fn new(sample_rate: i32) -> Self {
        assert!(sample_rate > 0, "sample rate must be positive");
        let mut ctx = Self {
            sample_rate,
            tempo: 0,
            ticks_per_line: 6,
            samples_per_tick: 0,
        };
        ctx.set_tempo(120);
        ctx
    }

    /// Change the tempo and rederive the per-tick sample count.
    pub fn set_tempo(&mut self, bpm: i32) {
        self.tempo = bpm;
        self.samples_per_tick = samples_per_line(self.sample_rate, bpm) / self.ticks_per_line;
    }
}

fn samples_per_beat(sample_rate: i32, bpm: i32) -> i32 {
    sample_rate * 60 / bpm
}

fn samples_per_line(sample_rate: i32, bpm: i32) -> i32 {
    // 4 lines per beat
    samples_per_beat(sample_rate, bpm) / 4
}

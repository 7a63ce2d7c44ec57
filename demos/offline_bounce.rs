//! Render a voice chain offline and print a block-by-block level meter.
//!
//! Run with: cargo run --example offline_bounce

use quanta_dsp::graph::{Delay, Gainer, Osc, SvFilter};
use quanta_dsp::{AudioContext, UnitGraph};

const SAMPLE_RATE: i32 = 44100;
const BLOCK_FRAMES: usize = 512;
const BLOCKS: usize = 64;

fn main() {
    tracing_subscriber::fmt::init();

    let mut graph = UnitGraph::new(AudioContext::new(SAMPLE_RATE));

    // osc -> svfilter -> delay -> gainer
    let gainer = graph.add_gainer();
    graph.set(gainer, Gainer::VOL, 128);
    graph.set(gainer, Gainer::PAN, 32);

    let delay = graph.add_delay();
    graph.set(delay, Delay::WET, 96);
    graph.set(delay, Delay::TIME, 64); // quarter of a second

    let filter = graph.add_svfilter();
    graph.set(filter, SvFilter::FREQ, 1800);
    graph.set(filter, SvFilter::RES, 140);

    let osc = graph.add_osc();
    graph.set(osc, Osc::ACTIVE, 1);
    graph.set(osc, Osc::VOL, 200);
    graph.set(osc, Osc::FREQ, 220);
    graph.set(osc, Osc::WAVE, 0); // saw

    graph.add_source(gainer, delay);
    graph.add_source(delay, filter);
    graph.add_source(filter, osc);

    let mut buffer = vec![0i16; BLOCK_FRAMES * 2];
    for block in 0..BLOCKS {
        buffer.fill(0);

        // Cut the oscillator halfway through so the delay tail is audible
        // in the meter.
        if block == BLOCKS / 2 {
            graph.set(osc, Osc::ACTIVE, 0);
        }

        graph.process(gainer, &mut buffer);

        let peak = buffer.iter().map(|&s| (s as i32).abs()).max().unwrap_or(0);
        let bar = "#".repeat((peak * 40 / i16::MAX as i32) as usize);
        println!("block {:2} | {:5} | {}", block, peak, bar);
    }

    println!(
        "rendered {} frames at {} Hz",
        BLOCK_FRAMES * BLOCKS,
        SAMPLE_RATE
    );
}

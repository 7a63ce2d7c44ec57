//! Play a filtered oscillator through the default output device.
//!
//! The graph renders on the main thread and hands whole blocks to the cpal
//! callback through the rtrb-backed block queue.
//!
//! Run with: cargo run --example beep

use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use quanta_dsp::graph::{Gainer, Osc, SvFilter};
use quanta_dsp::io::block_queue;
use quanta_dsp::{AudioContext, UnitGraph};

const BLOCK_FRAMES: usize = 512;

fn main() {
    tracing_subscriber::fmt::init();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .expect("no default output device available");
    let config = device
        .default_output_config()
        .expect("failed to fetch default output config");
    let sample_rate = config.sample_rate().0 as i32;
    let channels = config.channels() as usize;

    let mut graph = UnitGraph::new(AudioContext::new(sample_rate));
    let gainer = graph.add_gainer();
    graph.set(gainer, Gainer::VOL, 128);
    let filter = graph.add_svfilter();
    graph.set(filter, SvFilter::FREQ, 2500);
    graph.set(filter, SvFilter::RES, 100);
    let osc = graph.add_osc();
    graph.set(osc, Osc::ACTIVE, 1);
    graph.set(osc, Osc::VOL, 180);
    graph.set(osc, Osc::FREQ, 330);
    graph.set(osc, Osc::WAVE, 2); // square
    graph.add_source(gainer, filter);
    graph.add_source(filter, osc);

    let (mut writer, mut reader) = block_queue(8, BLOCK_FRAMES * 2);

    let stream = device
        .build_output_stream(
            &config.into(),
            {
                let mut block = vec![0i16; BLOCK_FRAMES * 2];
                let mut cursor = block.len();
                move |data: &mut [f32], _| {
                    for frame in data.chunks_mut(channels) {
                        if cursor >= block.len() {
                            if reader.pop(&mut block) {
                                cursor = 0;
                            } else {
                                frame.fill(0.0); // renderer fell behind
                                continue;
                            }
                        }
                        let left = block[cursor] as f32 / i16::MAX as f32;
                        let right = block[cursor + 1] as f32 / i16::MAX as f32;
                        cursor += 2;
                        for (ch, out) in frame.iter_mut().enumerate() {
                            *out = if ch % 2 == 0 { left } else { right };
                        }
                    }
                }
            },
            |err| eprintln!("stream error: {err}"),
            None,
        )
        .expect("failed to build output stream");
    stream.play().expect("failed to start output stream");

    // Render ahead of the callback for two seconds.
    let started = Instant::now();
    let mut buffer = vec![0i16; BLOCK_FRAMES * 2];
    while started.elapsed() < Duration::from_secs(2) {
        buffer.fill(0);
        graph.process(gainer, &mut buffer);
        while !writer.push(&buffer) {
            std::thread::sleep(Duration::from_millis(2));
        }
    }
}

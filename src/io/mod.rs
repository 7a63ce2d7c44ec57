//! Lock-free handoff of rendered blocks to an audio callback.
//!
//! The engine itself is single-threaded; an embedding that renders on a
//! control thread hands fully-formed interleaved blocks to the device
//! callback through this SPSC queue. Both ends are wait-free, so the
//! callback side never blocks on the renderer.

use rtrb::{Consumer, Producer, RingBuffer};

/// Create a queue with room for `blocks` blocks of `block_len` interleaved
/// samples.
pub fn block_queue(blocks: usize, block_len: usize) -> (BlockWriter, BlockReader) {
    let (producer, consumer) = RingBuffer::new(blocks * block_len);
    (
        BlockWriter { producer },
        BlockReader { consumer },
    )
}

/// Renderer-side end: pushes whole blocks, never partially.
pub struct BlockWriter {
    producer: Producer<i16>,
}

impl BlockWriter {
    /// Push one rendered block. Returns `false` (dropping nothing) when the
    /// queue does not have room for the whole block.
    pub fn push(&mut self, block: &[i16]) -> bool {
        let Ok(mut chunk) = self.producer.write_chunk(block.len()) else {
            return false;
        };
        let (first, second) = chunk.as_mut_slices();
        let split = first.len();
        first.copy_from_slice(&block[..split]);
        second.copy_from_slice(&block[split..]);
        chunk.commit_all();
        true
    }

    /// Samples the queue can currently accept.
    pub fn space(&self) -> usize {
        self.producer.slots()
    }
}

/// Callback-side end: pops whole blocks, never partially.
pub struct BlockReader {
    consumer: Consumer<i16>,
}

impl BlockReader {
    /// Fill `out` from the queue. Returns `false` and leaves `out` untouched
    /// when a whole block is not available yet (the callback should emit
    /// silence for that cycle).
    pub fn pop(&mut self, out: &mut [i16]) -> bool {
        let Ok(chunk) = self.consumer.read_chunk(out.len()) else {
            return false;
        };
        let (first, second) = chunk.as_slices();
        out[..first.len()].copy_from_slice(first);
        out[first.len()..].copy_from_slice(second);
        chunk.commit_all();
        true
    }

    /// Samples currently queued.
    pub fn available(&self) -> usize {
        self.consumer.slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_roundtrip_in_order() {
        let (mut writer, mut reader) = block_queue(4, 8);
        let a = [1i16; 8];
        let b = [2i16; 8];
        assert!(writer.push(&a));
        assert!(writer.push(&b));

        let mut out = [0i16; 8];
        assert!(reader.pop(&mut out));
        assert_eq!(out, a);
        assert!(reader.pop(&mut out));
        assert_eq!(out, b);
        assert!(!reader.pop(&mut out));
    }

    #[test]
    fn full_queue_rejects_whole_blocks() {
        let (mut writer, mut reader) = block_queue(2, 4);
        let block = [7i16; 4];
        assert!(writer.push(&block));
        assert!(writer.push(&block));
        assert!(!writer.push(&block), "third block must be rejected whole");
        assert_eq!(writer.space(), 0);

        let mut out = [0i16; 4];
        assert!(reader.pop(&mut out));
        assert!(writer.push(&block), "space frees a block at a time");
    }

    #[test]
    fn reader_reports_queued_samples() {
        let (mut writer, reader) = block_queue(2, 4);
        assert_eq!(reader.available(), 0);
        writer.push(&[0i16; 4]);
        assert_eq!(reader.available(), 4);
    }

    #[test]
    fn handoff_across_threads() {
        let (mut writer, mut reader) = block_queue(8, 64);
        let producer = std::thread::spawn(move || {
            let mut sent = 0u32;
            while sent < 100 {
                let block = [sent as i16; 64];
                if writer.push(&block) {
                    sent += 1;
                } else {
                    std::thread::yield_now();
                }
            }
        });

        let mut received = 0u32;
        let mut out = [0i16; 64];
        while received < 100 {
            if reader.pop(&mut out) {
                assert!(out.iter().all(|&s| s == received as i16));
                received += 1;
            } else {
                std::thread::yield_now();
            }
        }
        producer.join().unwrap();
    }
}

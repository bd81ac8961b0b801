//! Threaded integration tests for the ring buffer strategies.
//!
//! # Overview
//!
//! - **SPSC**: one producer thread and one consumer thread move a
//!   1,000,000-byte stream through a small lock-free buffer. Every byte is
//!   checked against the position it was written at.
//! - **Serialized**: two producers and one consumer share a buffer under the
//!   mutex and interrupt-mask strategies. Each producer tags its bytes:
//!
//! ```text
//!   bit 7      bits 6..0
//!   stream     sequence number mod 128
//! ```
//!
//!   The consumer demultiplexes by tag and checks that each stream arrives
//!   complete and in order. Interleaving between streams is arbitrary.
//!
//! # Running
//!
//! ```bash
//! cargo test -p basalt-ring --test spsc_threads -- --nocapture
//! ```

#![cfg(feature = "std")]

use basalt_ring::{HostRingBuffer, Strategy};
use std::io::Write;
use std::time::{Duration, Instant};

/// Writes to stderr with immediate flush to bypass test output capture.
macro_rules! log {
    ($($arg:tt)*) => {{
        let _ = writeln!(std::io::stderr(), $($arg)*);
        let _ = std::io::stderr().flush();
    }};
}

const SPSC_TOTAL: usize = 1_000_000;

/// Small enough that the producer hits "full" constantly and the indices
/// wrap thousands of times.
const SPSC_CAPACITY: usize = 257;

const PER_WRITER: usize = 50_000;

/// Fails the test instead of hanging if a thread stops making progress.
const DEADLINE: Duration = Duration::from_secs(60);

fn pattern(i: usize) -> u8 {
    (i.wrapping_mul(31) ^ (i >> 8)) as u8
}

#[test]
fn spsc_stream_arrives_complete_and_in_order() {
    let mut storage = vec![0u8; SPSC_CAPACITY];
    let rb = HostRingBuffer::create(&mut storage, Strategy::LockFree).unwrap();
    let start = Instant::now();

    std::thread::scope(|s| {
        s.spawn(|| {
            let mut sent = 0;
            let mut chunk = [0u8; 61];
            while sent < SPSC_TOTAL {
                assert!(start.elapsed() < DEADLINE, "producer stalled at {sent}");
                // Vary the burst length so both one- and two-segment copies occur.
                let len = (1 + sent % chunk.len()).min(SPSC_TOTAL - sent);
                for (k, b) in chunk[..len].iter_mut().enumerate() {
                    *b = pattern(sent + k);
                }
                let n = rb.write_many(&chunk[..len]);
                sent += n;
                if n < len {
                    std::thread::yield_now();
                }
            }
        });

        s.spawn(|| {
            let mut received = 0;
            let mut buf = [0u8; 97];
            while received < SPSC_TOTAL {
                assert!(start.elapsed() < DEADLINE, "consumer stalled at {received}");
                let n = if received % 3 == 0 {
                    rb.read_one().map_or(0, |b| {
                        buf[0] = b;
                        1
                    })
                } else {
                    rb.read_many(&mut buf)
                };
                for (k, &b) in buf[..n].iter().enumerate() {
                    assert_eq!(b, pattern(received + k), "byte {} corrupted", received + k);
                }
                received += n;
                if n == 0 {
                    std::thread::yield_now();
                }
            }
        });
    });

    log!("spsc: {} bytes in {:?}", SPSC_TOTAL, start.elapsed());
    assert!(rb.is_empty());

    #[cfg(feature = "stats")]
    {
        let stats = rb.stats();
        assert_eq!(stats.writes as usize, SPSC_TOTAL);
        assert_eq!(stats.reads as usize, SPSC_TOTAL);
    }
}

/// Two tagged producers, one demultiplexing consumer.
fn two_writers_one_reader(strategy: Strategy, batched: bool) {
    let mut storage = vec![0u8; 64];
    let rb = HostRingBuffer::create(&mut storage, strategy).unwrap();
    let start = Instant::now();

    std::thread::scope(|s| {
        for stream in 0..2u8 {
            let rb = &rb;
            s.spawn(move || {
                let tag = stream << 7;
                let mut seq = 0;
                while seq < PER_WRITER {
                    assert!(start.elapsed() < DEADLINE, "writer {stream} stalled");
                    let wrote = if batched {
                        let len = 8.min(PER_WRITER - seq);
                        let chunk: Vec<u8> =
                            (seq..seq + len).map(|i| tag | (i as u8 & 0x7f)).collect();
                        rb.write_many(&chunk)
                    } else {
                        usize::from(rb.write_one(tag | (seq as u8 & 0x7f)))
                    };
                    seq += wrote;
                    if wrote == 0 {
                        std::thread::yield_now();
                    }
                }
            });
        }

        s.spawn(|| {
            let mut next = [0usize; 2];
            let mut buf = [0u8; 16];
            while next[0] + next[1] < 2 * PER_WRITER {
                assert!(start.elapsed() < DEADLINE, "reader stalled at {next:?}");
                let n = rb.read_many(&mut buf);
                for &b in &buf[..n] {
                    let stream = usize::from(b >> 7);
                    assert_eq!(
                        b & 0x7f,
                        next[stream] as u8 & 0x7f,
                        "stream {stream} out of order at {}",
                        next[stream]
                    );
                    next[stream] += 1;
                }
                if n == 0 {
                    std::thread::yield_now();
                }
            }
            assert_eq!(next, [PER_WRITER; 2]);
        });
    });

    log!(
        "{strategy} (batched: {batched}): {} bytes in {:?}",
        2 * PER_WRITER,
        start.elapsed()
    );
    assert!(rb.is_empty());
}

#[test]
fn mutex_strategy_loses_nothing_with_two_writers() {
    two_writers_one_reader(Strategy::Mutex, true);
}

#[test]
fn mutex_strategy_single_byte_writers() {
    two_writers_one_reader(Strategy::Mutex, false);
}

#[test]
fn interrupt_mask_strategy_loses_nothing_with_two_writers() {
    two_writers_one_reader(Strategy::InterruptMask, false);
}

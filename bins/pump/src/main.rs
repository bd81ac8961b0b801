//! Pumps a byte stream from a bursty producer thread (standing in for a UART
//! receive interrupt) through a ring buffer to a draining consumer, then
//! reports throughput and buffer statistics.
//!
//! ```bash
//! cargo run -p basalt-pump -- pump.toml
//! ```

mod tap;

use anyhow::{Context, bail};
use basalt_config::PumpConfig;
use basalt_ring::{HostRingBuffer, Strategy, config::MAX_CAPACITY};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Fletcher-16 over a byte stream, updated incrementally.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Fletcher16 {
    a: u16,
    b: u16,
}

impl Fletcher16 {
    fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.a = (self.a + u16::from(byte)) % 255;
            self.b = (self.b + self.a) % 255;
        }
    }

    fn value(self) -> u16 {
        (self.b << 8) | self.a
    }
}

/// Byte `i` of the pumped stream: the top byte of a Fibonacci hash of the
/// position, so the stream never repeats with a power-of-two period.
fn source_byte(i: u64) -> u8 {
    (i.wrapping_mul(0x9e37_79b9_7f4a_7c15) >> 56) as u8
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "pump.toml".into());
    let config = PumpConfig::load_or_default(path.as_str())
        .with_context(|| format!("loading {path}"))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log_level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    basalt_ring::register(tap::TAP_ID, &tap::TAP)?;

    let strategy = config.strategy()?;
    info!(%strategy, capacity = config.capacity, total = config.total_bytes, "pump starting");

    let mut storage = [0u8; MAX_CAPACITY];
    let rb = HostRingBuffer::create(&mut storage[..config.capacity], strategy)?;

    let period = Duration::from_micros(config.producer_period_us);
    let total = config.total_bytes;
    let started = Instant::now();

    let (sent, (received, received_bytes, first_mismatch)) = std::thread::scope(|s| {
        let producer = s.spawn(|| {
            let mut sum = Fletcher16::default();
            let mut chunk = vec![0u8; config.chunk_size];
            let mut next = 0u64;
            let mut stalls = 0u64;

            while next < total {
                let len = (config.chunk_size as u64).min(total - next) as usize;
                for (k, slot) in chunk[..len].iter_mut().enumerate() {
                    *slot = source_byte(next + k as u64);
                }

                let mut offset = 0;
                while offset < len {
                    let n = rb.write_many(&chunk[offset..len]);
                    offset += n;
                    if offset < len {
                        stalls += 1;
                        std::thread::yield_now();
                    }
                }
                sum.update(&chunk[..len]);
                next += len as u64;

                if !period.is_zero() {
                    std::thread::sleep(period);
                }
            }
            debug!(stalls, "producer done");
            sum
        });

        let mut sum = Fletcher16::default();
        let mut buf = [0u8; 256];
        let mut received = 0u64;
        let mut first_mismatch = None;

        while received < total {
            let n = rb.read_many(&mut buf);
            if n == 0 {
                if producer.is_finished() && rb.is_empty() {
                    break;
                }
                std::thread::yield_now();
                continue;
            }
            for (k, &byte) in buf[..n].iter().enumerate() {
                let at = received + k as u64;
                if first_mismatch.is_none() && byte != source_byte(at) {
                    first_mismatch = Some(at);
                }
            }
            sum.update(&buf[..n]);
            received += n as u64;
        }

        let sent = producer.join();
        (sent, (sum, received, first_mismatch))
    });

    let sent = match sent {
        Ok(sum) => sum,
        Err(_) => bail!("producer thread panicked"),
    };
    let elapsed = started.elapsed();

    if let Some(at) = first_mismatch {
        bail!("stream corrupted at byte {at}");
    }
    if received_bytes != total {
        bail!("stream ended after {received_bytes} of {total} bytes");
    }
    if sent != received {
        bail!(
            "checksum mismatch: sent {:#06x}, received {:#06x}",
            sent.value(),
            received.value()
        );
    }

    let stats = rb.stats();
    let mib_per_s = total as f64 / (1024.0 * 1024.0) / elapsed.as_secs_f64();
    info!(
        %strategy,
        bytes = total,
        elapsed_ms = elapsed.as_millis() as u64,
        mib_per_s = format_args!("{mib_per_s:.2}"),
        checksum = format_args!("{:#06x}", received.value()),
        "pump finished"
    );
    info!(
        writes = stats.writes,
        reads = stats.reads,
        overflows = stats.overflows,
        "buffer statistics"
    );
    if strategy == Strategy::Custom(tap::TAP_ID) {
        info!(accepted = tap::TAP.accepted(), "tap strategy");
    }

    Ok(())
}

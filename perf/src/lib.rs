//! Measurement helpers shared by the `perf_report` binary and its tests.
//!
//! Latencies are kept as nanosecond samples and summarized by nearest-rank
//! percentiles; summaries serialize straight into the JSON report.

use basalt_ring::{HostRingBuffer, RingStats, Strategy};
use std::fmt;
use std::time::{Duration, Instant};

// ─── Latency Summary ────────────────────────────────────────────────────────

/// Distribution of a set of nanosecond samples.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct LatencySummary {
    pub count: usize,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub stddev: f64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub p999: u64,
}

impl LatencySummary {
    /// Sorts `samples` in place and summarizes them. `None` if there are none.
    pub fn from_samples(samples: &mut [u64]) -> Option<Self> {
        samples.sort_unstable();
        let (&min, &max) = (samples.first()?, samples.last()?);
        let count = samples.len();
        let n = count as f64;

        let (sum, sum_sq) = samples.iter().fold((0.0, 0.0), |(s, sq), &x| {
            let x = x as f64;
            (s + x, sq + x * x)
        });
        let mean = sum / n;
        // Population variance; clamp the rounding error of E[x^2] - E[x]^2.
        let stddev = (sum_sq / n - mean * mean).max(0.0).sqrt();

        Some(Self {
            count,
            min,
            max,
            mean,
            stddev,
            p50: nearest_rank(samples, 500),
            p90: nearest_rank(samples, 900),
            p99: nearest_rank(samples, 990),
            p999: nearest_rank(samples, 999),
        })
    }
}

/// Nearest-rank percentile of a non-empty sorted slice, `per_mille` in 0..=1000.
fn nearest_rank(sorted: &[u64], per_mille: usize) -> u64 {
    let rank = (per_mille * sorted.len()).div_ceil(1000);
    sorted[rank.clamp(1, sorted.len()) - 1]
}

// ─── Operation Timing ───────────────────────────────────────────────────────

/// How [`time_per_op`] samples an operation.
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    /// Timed rounds; each contributes one sample.
    pub rounds: usize,
    /// Calls per round, averaged into that round's sample.
    pub ops_per_round: usize,
    /// Untimed rounds run first.
    pub warmup_rounds: usize,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            rounds: 500,
            ops_per_round: 10_000,
            warmup_rounds: 50,
        }
    }
}

/// Cost of one ring operation, in nanoseconds per call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OpCost {
    pub name: String,
    pub ns_per_op: LatencySummary,
}

/// Times `op` in rounds of `ops_per_round` calls so that clock overhead
/// amortizes away, recording the per-call mean of each round rounded up.
/// `None` if `sampling.rounds` is zero.
///
/// # Panics
///
/// If `sampling.ops_per_round` is zero.
pub fn time_per_op(
    name: impl Into<String>,
    sampling: Sampling,
    mut op: impl FnMut(),
) -> Option<OpCost> {
    let Sampling {
        rounds,
        ops_per_round,
        warmup_rounds,
    } = sampling;
    assert!(ops_per_round > 0, "rounds need at least one call");

    for _ in 0..warmup_rounds * ops_per_round {
        op();
    }

    let per_round = ops_per_round as u128;
    let mut samples: Vec<u64> = (0..rounds)
        .map(|_| {
            let start = Instant::now();
            (0..ops_per_round).for_each(|_| op());
            let ns = start.elapsed().as_nanos();
            (ns.div_ceil(per_round) as u64).max(1)
        })
        .collect();

    Some(OpCost {
        name: name.into(),
        ns_per_op: LatencySummary::from_samples(&mut samples)?,
    })
}

impl fmt::Display for OpCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.ns_per_op;
        write!(
            f,
            "  {:<32} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            self.name,
            human_ns(s.min),
            human_ns(s.p50),
            human_ns(s.p90),
            human_ns(s.p99),
            human_ns(s.p999),
            human_ns(s.max),
        )
    }
}

/// Column header matching the [`OpCost`] display row.
pub fn print_op_header() {
    println!(
        "  {:<32} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "operation", "min", "p50", "p90", "p99", "p99.9", "max",
    );
    println!("  {}", "─".repeat(86));
}

// ─── Cross-Thread Pipeline ──────────────────────────────────────────────────

pub const BUILTIN_STRATEGIES: [Strategy; 3] =
    [Strategy::LockFree, Strategy::InterruptMask, Strategy::Mutex];

/// Outcome of one producer → consumer run through a ring buffer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineResult {
    pub strategy: String,
    pub capacity: usize,
    pub chunk: usize,
    pub bytes: u64,
    pub elapsed_ns: u64,
    pub mib_per_s: f64,
    /// Producer-side `write_many` calls that could not store the whole chunk.
    pub overflows: u32,
    /// Latency of each consumer `read_many` call that returned data.
    pub read_call: Option<LatencySummary>,
}

/// Moves `total` bytes from a producer thread to a consumer thread through a
/// fresh buffer of `capacity` bytes bound to `strategy`.
///
/// # Panics
///
/// If `chunk` or `total` is zero, the buffer cannot be created, or the
/// consumer sees a byte out of order.
pub fn run_pipeline(strategy: Strategy, capacity: usize, chunk: usize, total: u64) -> PipelineResult {
    assert!(chunk > 0 && total > 0, "empty pipeline");
    let mut storage = vec![0u8; capacity];
    let rb = HostRingBuffer::create(&mut storage, strategy)
        .unwrap_or_else(|err| panic!("create {strategy} ring: {err}"));

    let start = Instant::now();
    let mut read_ns: Vec<u64> = Vec::new();

    std::thread::scope(|s| {
        s.spawn(|| {
            let data: Vec<u8> = (0..chunk).map(|i| i as u8).collect();
            let mut sent = 0u64;
            while sent < total {
                let len = (chunk as u64).min(total - sent) as usize;
                let mut offset = 0;
                while offset < len {
                    offset += rb.write_many(&data[offset..len]);
                    if offset < len {
                        std::hint::spin_loop();
                    }
                }
                sent += len as u64;
            }
        });

        let mut buf = vec![0u8; chunk];
        let mut received = 0u64;
        let mut expected = 0u8;
        let mut in_chunk = 0usize;
        while received < total {
            let t0 = Instant::now();
            let n = rb.read_many(&mut buf);
            if n == 0 {
                std::hint::spin_loop();
                continue;
            }
            read_ns.push(t0.elapsed().as_nanos() as u64);
            for &b in &buf[..n] {
                assert_eq!(b, expected, "pipeline reordered bytes at {received}");
                in_chunk += 1;
                expected = expected.wrapping_add(1);
                if in_chunk == chunk {
                    in_chunk = 0;
                    expected = 0;
                }
            }
            received += n as u64;
        }
    });

    let elapsed = start.elapsed();
    let RingStats { overflows, .. } = rb.stats();

    PipelineResult {
        strategy: strategy.to_string(),
        capacity,
        chunk,
        bytes: total,
        elapsed_ns: elapsed.as_nanos() as u64,
        mib_per_s: mib_per_s(total, elapsed),
        overflows,
        read_call: LatencySummary::from_samples(&mut read_ns),
    }
}

pub fn mib_per_s(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return 0.0;
    }
    bytes as f64 / (1024.0 * 1024.0) / secs
}

// ─── Display ────────────────────────────────────────────────────────────────

/// `bytes` in the largest binary unit that keeps the value at least 1.
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

pub fn human_ns(ns: u64) -> String {
    match ns {
        0..1_000 => format!("{ns} ns"),
        1_000..1_000_000 => format!("{:.1} us", ns as f64 / 1e3),
        _ => format!("{:.1} ms", ns as f64 / 1e6),
    }
}

pub fn section_header(title: &str) {
    let rule = "─".repeat(90);
    println!("\n{rule}\n  {title}\n{rule}\n");
}

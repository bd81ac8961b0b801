use std::hint::black_box;
use std::time::SystemTime;

use basalt_perf::*;
use basalt_ring::{HostRingBuffer, RingCore, Strategy};

const PIPELINE_BYTES: u64 = 16 << 20;

fn main() {
    let mut results: Vec<OpCost> = Vec::new();

    // ═══════════════════════════════════════════════════════════════════════
    // 1. Banner
    // ═══════════════════════════════════════════════════════════════════════
    print_banner();

    // ═══════════════════════════════════════════════════════════════════════
    // 2. Memory Layout
    // ═══════════════════════════════════════════════════════════════════════
    section_memory_layout();

    // ═══════════════════════════════════════════════════════════════════════
    // 3. Single-Thread Operation Cost
    // ═══════════════════════════════════════════════════════════════════════
    section_operations(&mut results);

    // ═══════════════════════════════════════════════════════════════════════
    // 4. Cross-Thread Pipeline
    // ═══════════════════════════════════════════════════════════════════════
    let pipelines = section_pipeline();

    // ═══════════════════════════════════════════════════════════════════════
    // 5. JSON Output
    // ═══════════════════════════════════════════════════════════════════════
    save_results(&results, &pipelines);
}

fn print_banner() {
    let bar = "\u{2550}".repeat(90);
    println!("\n{bar}");
    println!("  BASALT RING BUFFER PERFORMANCE REPORT");
    println!("  batched single-thread ops + cross-thread pipeline per strategy");
    println!("{bar}\n");

    let ncpu = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(0);
    println!("  CPUs:    {ncpu}");
    println!("  Arch:    {}", std::env::consts::ARCH);
    println!("  OS:      {}", std::env::consts::OS);
}

fn section_memory_layout() {
    section_header("MEMORY LAYOUT");
    println!(
        "  {:<30} {:>6} bytes",
        "RingCore",
        std::mem::size_of::<RingCore<'static>>()
    );
    println!(
        "  {:<30} {:>6} bytes",
        "HostRingBuffer",
        std::mem::size_of::<HostRingBuffer<'static>>()
    );
    println!("  {:<30} {:>6} bytes", "Strategy", std::mem::size_of::<Strategy>());
}

fn section_operations(results: &mut Vec<OpCost>) {
    section_header("SINGLE-THREAD OPERATION COST (per call)");
    print_op_header();

    let mut record = |cost: Option<OpCost>| {
        if let Some(cost) = cost {
            println!("{cost}");
            results.push(cost);
        }
    };
    let sampling = Sampling::default();

    for strategy in BUILTIN_STRATEGIES {
        let mut storage = vec![0u8; 1024];
        let rb = match HostRingBuffer::create(&mut storage, strategy) {
            Ok(rb) => rb,
            Err(err) => {
                eprintln!("  [skipping {strategy}: {err}]");
                continue;
            }
        };

        record(time_per_op(format!("write+read one ({strategy})"), sampling, || {
            rb.write_one(black_box(1));
            black_box(rb.read_one());
        }));

        let data = [7u8; 64];
        let mut out = [0u8; 64];
        record(time_per_op(format!("write+read 64B ({strategy})"), sampling, || {
            rb.write_many(black_box(&data));
            black_box(rb.read_many(&mut out));
        }));

        record(time_per_op(format!("occupied ({strategy})"), sampling, || {
            black_box(rb.occupied());
        }));
    }
}

fn section_pipeline() -> Vec<PipelineResult> {
    section_header("CROSS-THREAD PIPELINE (producer thread -> consumer thread)");
    println!(
        "  {:<10} {:>8} {:>6} {:>10} {:>10} {:>10} {:>10}",
        "strategy", "capacity", "chunk", "bytes", "MiB/s", "overflows", "read p50"
    );
    println!("  {}", "─".repeat(80));

    let mut out = Vec::new();
    for strategy in BUILTIN_STRATEGIES {
        for (capacity, chunk) in [(1024, 16), (4096, 64)] {
            let r = run_pipeline(strategy, capacity, chunk, PIPELINE_BYTES);
            println!(
                "  {:<10} {:>8} {:>6} {:>10} {:>10.1} {:>10} {:>10}",
                r.strategy,
                r.capacity,
                r.chunk,
                human_bytes(r.bytes),
                r.mib_per_s,
                r.overflows,
                r.read_call.map_or_else(|| "-".to_string(), |s| human_ns(s.p50)),
            );
            out.push(r);
        }
    }
    out
}

fn save_results(results: &[OpCost], pipelines: &[PipelineResult]) {
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let results_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/results");
    let _ = std::fs::create_dir_all(results_dir);
    let json_path = format!("{results_dir}/{timestamp}_report.json");

    let output = serde_json::json!({
        "report_type": "ring",
        "timestamp": timestamp,
        "operations": results,
        "pipeline": pipelines,
    });

    let bar = "\u{2550}".repeat(90);
    let written = serde_json::to_string_pretty(&output)
        .map_err(std::io::Error::other)
        .and_then(|text| std::fs::write(&json_path, text));
    match written {
        Ok(()) => {
            println!("\n{bar}");
            println!("  Results saved to: {json_path}");
            println!("{bar}\n");
        }
        Err(e) => eprintln!("\n  [failed to save results: {e}]\n"),
    }
}

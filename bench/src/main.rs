use cellgc::demo::create_list;
use cellgc::{Collector, GcError};
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize)]
struct BenchmarkResult {
    name: String,
    heap_size: usize,
    allocations: u64,
    collections: u64,
    reclaimed: u64,
    secs: f64,
}

#[derive(Serialize)]
struct BenchmarkOutput {
    results: Vec<BenchmarkResult>,
}

/// Build and drop short lists so every collection frees almost everything.
fn churn(gc: &mut Collector, rounds: usize) -> Result<(), GcError> {
    let values: Vec<i32> = (0..8).collect();
    for _ in 0..rounds {
        create_list(gc, "tmp", &values)?;
        gc.unbind_variable("tmp");
    }
    Ok(())
}

/// Keep a long list rooted while churning, so each collection has to trace it.
fn retained_churn(gc: &mut Collector, rounds: usize) -> Result<(), GcError> {
    let keep = gc.heap_size() / 4;
    let values: Vec<i32> = (0..keep as i32).collect();
    create_list(gc, "keep", &values)?;
    churn(gc, rounds)
}

fn run_benchmark<F>(name: &str, heap_size: usize, rounds: usize, f: F) -> BenchmarkResult
where
    F: FnOnce(&mut Collector, usize) -> Result<(), GcError>,
{
    let mut gc = match Collector::new(heap_size) {
        Ok(gc) => gc,
        Err(e) => panic!("invalid benchmark heap size {}: {}", heap_size, e),
    };

    let start = Instant::now();
    let result = f(&mut gc, rounds);
    let secs = start.elapsed().as_secs_f64();

    if let Err(e) = result {
        eprintln!("benchmark {} (heap={}) failed: {}", name, heap_size, e);
    }

    let stats = gc.stats();
    BenchmarkResult {
        name: name.to_string(),
        heap_size,
        allocations: stats.allocations,
        collections: stats.collections,
        reclaimed: stats.reclaimed,
        secs,
    }
}

fn main() {
    let mut results = Vec::new();

    for heap_size in [64, 1024, 16384] {
        results.push(run_benchmark("churn", heap_size, 20_000, churn));
        results.push(run_benchmark(
            "retained_churn",
            heap_size,
            20_000,
            retained_churn,
        ));
    }

    let output = BenchmarkOutput { results };
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize results: {}", e),
    }
}

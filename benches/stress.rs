use std::sync::Arc;
use std::time::{Duration, Instant};

use parklot::engine::{Engine, ManualClock};
use parklot::model::*;

const MINUTE: Ms = 60_000;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    if latencies.is_empty() {
        println!("  {label}: no samples");
        return;
    }
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.1}us, p50={:.1}us, p95={:.1}us, p99={:.1}us, max={:.1}us",
        latencies.len(),
        avg.as_secs_f64() * 1e6,
        percentile(latencies, 50.0).as_secs_f64() * 1e6,
        percentile(latencies, 95.0).as_secs_f64() * 1e6,
        percentile(latencies, 99.0).as_secs_f64() * 1e6,
        latencies[latencies.len() - 1].as_secs_f64() * 1e6,
    );
}

fn build_lot(floors: u32) -> (Arc<Engine>, Arc<ManualClock>) {
    let floor = FloorLayout::new([
        (VehicleCategory::Car, 200),
        (VehicleCategory::Motorcycle, 100),
        (VehicleCategory::Truck, 20),
    ]);
    let clock = Arc::new(ManualClock::new(0));
    let engine = Engine::with_rate(&LotLayout::uniform(floors, floor), 50, clock.clone())
        .expect("layout within limits");
    (Arc::new(engine), clock)
}

async fn phase1_sequential() {
    let (engine, clock) = build_lot(4);
    let n = 20_000;
    let mut enter_lat = Vec::with_capacity(n);
    let mut exit_lat = Vec::with_capacity(n);
    let start = Instant::now();

    for i in 0..n {
        let t = Instant::now();
        let ticket = engine
            .enter(Vehicle::new(format!("SEQ-{i}"), VehicleCategory::Car))
            .await
            .expect("lot has room");
        enter_lat.push(t.elapsed());

        clock.advance(37 * MINUTE);
        let t = Instant::now();
        engine.exit(ticket.id).await.expect("ticket is live");
        exit_lat.push(t.elapsed());
    }

    let elapsed = start.elapsed();
    let ops = (2 * n) as f64 / elapsed.as_secs_f64();
    println!("  {n} enter/exit pairs in {:.2}s = {ops:.0} ops/sec", elapsed.as_secs_f64());
    print_latency("enter latency", &mut enter_lat);
    print_latency("exit latency", &mut exit_lat);
}

async fn phase2_fill_to_capacity() {
    let (engine, _clock) = build_lot(16);
    let capacity = engine.capacity(VehicleCategory::Car).await;
    let mut latencies = Vec::with_capacity(capacity);

    // First-fit walks every full floor, so late entries are the slow ones.
    for i in 0..capacity {
        let t = Instant::now();
        engine
            .enter(Vehicle::new(format!("FILL-{i}"), VehicleCategory::Car))
            .await
            .expect("lot has room");
        latencies.push(t.elapsed());
    }
    let t = Instant::now();
    let rejected = engine
        .enter(Vehicle::new("FILL-OVER", VehicleCategory::Car))
        .await
        .is_err();
    let reject_lat = t.elapsed();

    println!("  filled {capacity} car spots, overflow rejected: {rejected}");
    print_latency("enter latency while filling", &mut latencies);
    println!("  rejection on a full lot: {:.1}us", reject_lat.as_secs_f64() * 1e6);
}

async fn phase3_concurrent() {
    let (engine, _clock) = build_lot(8);
    let n_tasks = 16;
    let n_per_task = 2_000;

    let start = Instant::now();
    let mut handles = Vec::new();
    for task in 0..n_tasks {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let mut latencies = Vec::with_capacity(n_per_task);
            let mut rejected = 0usize;
            for i in 0..n_per_task {
                let category = match i % 5 {
                    0 => VehicleCategory::Motorcycle,
                    1 => VehicleCategory::Truck,
                    _ => VehicleCategory::Car,
                };
                let t = Instant::now();
                match engine
                    .enter(Vehicle::new(format!("T{task}-{i}"), category))
                    .await
                {
                    Ok(ticket) => {
                        let _ = engine.exit(ticket.id).await;
                        latencies.push(t.elapsed());
                    }
                    Err(_) => rejected += 1,
                }
            }
            (latencies, rejected)
        }));
    }

    let mut all = Vec::new();
    let mut rejected = 0;
    for h in handles {
        let (lat, rej) = h.await.expect("task panicked");
        all.extend(lat);
        rejected += rej;
    }
    let elapsed = start.elapsed();
    let ops = all.len() as f64 / elapsed.as_secs_f64();
    println!(
        "  {} round trips across {n_tasks} tasks in {:.2}s = {ops:.0}/sec, {rejected} rejected",
        all.len(),
        elapsed.as_secs_f64()
    );
    print_latency("enter+exit latency", &mut all);
    println!("  active tickets after run: {}", engine.active_count());
}

#[tokio::main]
async fn main() {
    println!("=== parklot stress benchmark ===\n");

    println!("[phase 1] sequential enter/exit");
    phase1_sequential().await;

    println!("\n[phase 2] fill to capacity");
    phase2_fill_to_capacity().await;

    println!("\n[phase 3] concurrent traffic");
    phase3_concurrent().await;

    println!("\n=== done ===");
}

//! End-to-end demonstration: build an initial engine snapshot, spawn
//! a simulated worker fleet, and drive it through one or more live
//! rule reloads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use warden_detect_core::{AppInspectionRegistry, EngineSnapshot, MasterRegistry, MpmMatcher, SyncLatch, register_builtins};
use warden_detect_types::{MapConfigSource, SnapshotId};
use warden_detect_worker::{Fleet, PacketKind, ReloadOrchestrator, ThreadContext};

/// Drives a simulated detect-engine fleet through one or more rule
/// reloads and reports what happened.
#[derive(Parser, Debug)]
#[command(name = "warden-detect-demo")]
#[command(about = "Simulates a detect-engine worker fleet and a live rule reload")]
struct Cli {
    /// Number of simulated packet-processing workers.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Number of sequential reloads to run.
    #[arg(long, default_value_t = 1)]
    reloads: usize,
}

fn build_snapshot(id: u64) -> Result<Arc<EngineSnapshot>> {
    let config = MapConfigSource::new();
    let snapshot = EngineSnapshot::init(SnapshotId(id), &config, None, MpmMatcher::Default, false, Vec::new(), 0)
        .with_context(|| format!("failed to build engine snapshot {id}"))?;
    Ok(Arc::new(snapshot))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::try_init().ok();
    let cli = Cli::parse();

    let registry = MasterRegistry::new();
    let app_inspection = AppInspectionRegistry::new();
    register_builtins(&app_inspection);

    let initial = build_snapshot(0)?;
    registry.add_to_master(initial.clone());

    let mut fleet = Fleet::new();
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut worker_threads = Vec::with_capacity(cli.workers);
    for worker_id in 0..cli.workers {
        let ctx = Arc::new(
            ThreadContext::init(worker_id as u64, &registry, None, false)
                .context("failed to initialize a worker's thread context")?,
        );
        let slot = fleet.spawn(worker_id as u64, ctx);
        let shutdown = shutdown.clone();
        worker_threads.push(std::thread::spawn(move || {
            while !shutdown.load(Ordering::Acquire) {
                let _packet = slot.queue.dequeue_blocking();
                slot.load().mark_adopted();
            }
        }));
    }
    tracing::info!(workers = cli.workers, "fleet started");

    let orchestrator = ReloadOrchestrator::new();
    let latch = SyncLatch::new();
    for reload_index in 1..=cli.reloads {
        let snapshot = build_snapshot(reload_index as u64)?;
        registry.add_to_master(snapshot.clone());

        latch.request_reload();
        let config = MapConfigSource::new();
        match orchestrator.run(&registry, &fleet, &snapshot, &config, &latch, &shutdown)? {
            Some(report) => {
                tracing::info!(reload_id = report.reload_id, workers = report.workers, "reload complete");
                latch.consume_done();
            }
            None => tracing::warn!("reload skipped: fleet has no workers"),
        }
        registry.prune_free_list();
    }

    shutdown.store(true, Ordering::Release);
    for worker in fleet.workers() {
        worker.slot.queue.enqueue(PacketKind::Data);
    }
    for handle in worker_threads {
        handle.join().expect("worker thread panicked");
    }

    println!(
        "engine enabled: {}, active snapshots: {}, free snapshots: {}",
        registry.detect_engine_enabled(),
        registry.active_len(),
        registry.free_len()
    );
    Ok(())
}

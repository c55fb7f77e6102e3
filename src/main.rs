use std::sync::Arc;
use std::time::Instant;

use rand::RngCore;
use rand::SeedableRng;
use torus_life::{
    BarrierPool, ConwayRule, Engine, Grid, Neighborhood, Sequential, WorkSteal, WorkStealConfig,
    auto_thread_count,
};

const WIDTH: usize = 512;
const HEIGHT: usize = 512;
const LIVE_DENSITY: f64 = 0.42;
const TOTAL_STEPS: u64 = 500;
const CHECK_INTERVAL: u64 = 100;
const SOUP_SEED: u64 = 0x5EED_1234_ABCD_EF01;

struct MainArgs {
    engine: EngineKind,
    threads: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EngineKind {
    Barrier,
    Steal,
}

fn parse_args() -> MainArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut engine = EngineKind::Barrier;
    let mut threads = auto_thread_count();
    let next_arg = |i: usize, flag: &str| -> &str {
        args.get(i)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("{flag} requires a value"))
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--engine" => {
                i += 1;
                engine = match next_arg(i, "--engine") {
                    "barrier" => EngineKind::Barrier,
                    "steal" => EngineKind::Steal,
                    other => panic!("unknown engine: {other} (expected barrier or steal)"),
                };
            }
            "--threads" => {
                i += 1;
                threads = next_arg(i, "--threads")
                    .parse()
                    .expect("--threads requires a positive integer");
            }
            other => panic!("unknown argument: {other}\nusage: torus-life [--engine barrier|steal] [--threads N]"),
        }
        i += 1;
    }
    MainArgs { engine, threads }
}

fn random_soup() -> Vec<bool> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(SOUP_SEED);
    let threshold = (u64::MAX as f64 * LIVE_DENSITY) as u64;
    (0..WIDTH * HEIGHT).map(|_| rng.next_u64() <= threshold).collect()
}

fn population(state: &[bool]) -> usize {
    state.iter().filter(|&&s| s).count()
}

fn new_grid() -> Grid {
    Grid::new(WIDTH, HEIGHT, Neighborhood::Moore, Arc::new(ConwayRule))
        .expect("demo grid dimensions are valid")
}

fn run_checked(args: MainArgs) {
    let mut reference = Sequential::new(new_grid());
    let mut parallel: Box<dyn Engine> = match args.engine {
        EngineKind::Barrier => Box::new(BarrierPool::new(new_grid(), args.threads)),
        EngineKind::Steal => Box::new(WorkSteal::with_config(
            new_grid(),
            WorkStealConfig::default().thread_count(args.threads),
        )),
    };
    let name = match args.engine {
        EngineKind::Barrier => "BarrierPool",
        EngineKind::Steal => "WorkSteal",
    };

    let soup = random_soup();
    reference.initialize(&soup).expect("soup covers the grid");
    parallel.initialize(&soup).expect("soup covers the grid");

    let mut reference_total = std::time::Duration::ZERO;
    let mut parallel_total = std::time::Duration::ZERO;

    for checkpoint in 1..=(TOTAL_STEPS / CHECK_INTERVAL) {
        let step = checkpoint * CHECK_INTERVAL;

        let start = Instant::now();
        for _ in 0..CHECK_INTERVAL {
            reference.step();
        }
        reference_total += start.elapsed();

        let start = Instant::now();
        for _ in 0..CHECK_INTERVAL {
            parallel.step();
        }
        parallel_total += start.elapsed();

        let reference_state = reference.current_state();
        let parallel_state = parallel.current_state();
        let match_status = if reference_state == parallel_state {
            "MATCH"
        } else {
            "MISMATCH"
        };
        println!(
            "Step {step}: Sequential pop = {}, {name} pop = {} [{match_status}]",
            population(&reference_state),
            population(&parallel_state),
        );
    }

    let reference_ms = reference_total.as_secs_f64() * 1000.0;
    let parallel_ms = parallel_total.as_secs_f64() * 1000.0;
    let speedup = reference_ms / parallel_ms;

    println!("\n--- Summary ({TOTAL_STEPS} steps, {}x{}, {} threads) ---", WIDTH, HEIGHT, args.threads);
    println!("Sequential: {reference_ms:.3} ms total, {:.6} ms/step", reference_ms / TOTAL_STEPS as f64);
    println!("{name}: {parallel_ms:.3} ms total, {:.6} ms/step", parallel_ms / TOTAL_STEPS as f64);
    println!("Speedup (Sequential / {name}): {speedup:.2}x");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    run_checked(parse_args());
}

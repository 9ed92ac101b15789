use std::hint::black_box;
use std::time::Instant;

use aviator_kernel::{SimConfig, World};
use glam::Vec2;

fn bench_build(iterations: usize) {
    let start = Instant::now();
    for i in 0..iterations {
        let world = World::new(SimConfig {
            seed: i as u64,
            ..SimConfig::default()
        });
        black_box(world.ok());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  build x{iterations}: {per_iter:?}/iter ({elapsed:?})");
}

fn bench_step(cloud_count: u32, iterations: usize) {
    let Ok(mut world) = World::new(SimConfig {
        cloud_count,
        ..SimConfig::default()
    }) else {
        println!("  step ({cloud_count} clouds): world construction failed");
        return;
    };

    let start = Instant::now();
    for i in 0..iterations {
        let t = i as f32 * 0.01;
        world.set_pointer(Vec2::new(t.sin(), t.cos()));
        if world.step().is_err() {
            println!("  step ({cloud_count} clouds): step failed at {i}");
            return;
        }
    }
    black_box(world.state_hash());
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  step ({cloud_count} clouds, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("World construction:");
    bench_build(100);

    println!("World::step:");
    for clouds in [20, 200] {
        bench_step(clouds, 10_000);
    }
}

use criterion::{criterion_group, criterion_main, Criterion};
use gridboard::footprint::Rect;
use gridboard::level::LevelConfig;
use gridboard::scene::{PieceKey, Scene};
use std::hint::black_box;
use std::path::PathBuf;

fn setup_scene() -> (Scene, Vec<PieceKey>) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/levels/poster.json");
    let level = LevelConfig::load_from_file(path).expect("Failed to load level");
    let (mut scene, keys) = level.build_scene().expect("Failed to build scene");
    // Complete the poster so the layout gate runs every check.
    scene
        .try_snap_to_rect(keys[3], Rect::new(7, 6, 7, 7), false)
        .expect("Unknown piece");
    (scene, keys)
}

fn criterion_benchmark(c: &mut Criterion) {
    let (mut scene, keys) = setup_scene();

    c.bench_function("evaluate (9 rules, 4 pieces)", |b| {
        b.iter(|| black_box(scene.evaluate_now()))
    });

    c.bench_function("snapshot capture", |b| b.iter(|| black_box(scene.snapshot())));

    // Pick the date up and drop it back on the same cells.
    let date = keys[3];
    let home = scene.board().world_pos_for_rect(&Rect::new(7, 6, 7, 7));
    c.bench_function("drag cycle", |b| {
        b.iter(|| {
            scene.begin_drag(date, home).ok();
            scene.drag_to(date, black_box(home)).ok();
            let outcome = scene.end_drag(date).ok();
            scene.settle();
            black_box(outcome)
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

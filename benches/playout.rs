use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use ludeme_sim::core::Context;
use ludeme_sim::games::{RuleShape, TicTacToe, TrackFill};
use ludeme_sim::playout::{PlayoutConfig, PlayoutEngine};

fn bench_playouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("tictactoe_playout");

    for shape in [RuleShape::Do, RuleShape::IfElseDo, RuleShape::OrDoPass] {
        let game = TicTacToe::new().shape(shape).build().unwrap();
        let name = format!("{shape:?}").to_lowercase();

        group.bench_function(format!("general_{name}"), |b| {
            let mut engine = PlayoutEngine::new(PlayoutConfig::default());
            b.iter_batched(
                || Context::new(Arc::clone(&game), 7),
                |mut ctx| black_box(engine.run(&mut ctx).unwrap()),
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("fast_{name}"), |b| {
            let mut engine = PlayoutEngine::new(PlayoutConfig::default());
            b.iter_batched(
                || Context::new(Arc::clone(&game), 7),
                |mut ctx| black_box(engine.run_fast(&mut ctx).unwrap()),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_track(c: &mut Criterion) {
    let mut group = c.benchmark_group("track_fill_playout");
    let game = TrackFill::new().length(32).build().unwrap();

    group.bench_function("first_move_on_track", |b| {
        let mut engine = PlayoutEngine::new(PlayoutConfig::default());
        b.iter_batched(
            || Context::new(Arc::clone(&game), 3),
            |mut ctx| black_box(engine.run_auto(&mut ctx).unwrap()),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_temp_copy(c: &mut Criterion) {
    let game = TicTacToe::new().build().unwrap();
    let mut ctx = Context::new(Arc::clone(&game), 1);
    PlayoutEngine::new(PlayoutConfig::default().with_max_actions(6))
        .run(&mut ctx)
        .unwrap();

    c.bench_function("context_temp_copy", |b| {
        b.iter(|| black_box(ctx.temp_copy()));
    });
}

criterion_group!(benches, bench_playouts, bench_track, bench_temp_copy);
criterion_main!(benches);

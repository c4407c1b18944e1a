// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::time::Duration;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Size;
use understory_scenes::proportions::AspectRatio;
use understory_scenes::router::Scenes;
use understory_scenes::scene::{SceneConfig, Teardown};
use understory_scenes::types::Host;

#[derive(Default)]
struct Sink {
    ops: u64,
}

impl Host for Sink {
    fn add_class(&mut self, _class: &str) {
        self.ops += 1;
    }
    fn remove_class(&mut self, _class: &str) {
        self.ops += 1;
    }
    fn clear_children(&mut self) {
        self.ops += 1;
    }
    fn set_style(&mut self, _property: &str, _value: Option<&str>) {
        self.ops += 1;
    }
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn registry(n: usize) -> Scenes<Sink> {
    let ratio = AspectRatio::new(16, 9).unwrap();
    let mut scenes = Scenes::new(Sink::default(), ratio, Size::new(1920.0, 1080.0));
    for i in 0..n {
        let config = SceneConfig::new(|_| Teardown::noop()).with_path(format!("/scene-{i}"));
        scenes.add(format!("scene-{i}"), config).unwrap();
    }
    scenes
}

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");
    for &n in &[16usize, 256, 4096] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("add_n{n}"), |b| {
            b.iter(|| black_box(registry(n).len()));
        });
        let scenes = registry(n);
        let names: Vec<String> = (0..n).map(|i| format!("scene-{i}")).collect();
        let paths: Vec<String> = (0..n).map(|i| format!("/scene-{i}")).collect();
        group.bench_function(format!("has_by_name_n{n}"), |b| {
            b.iter(|| names.iter().filter(|id| scenes.has(id)).count());
        });
        group.bench_function(format!("has_by_path_n{n}"), |b| {
            b.iter(|| paths.iter().filter(|id| scenes.has(id)).count());
        });
    }
    group.finish();
}

fn bench_transitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("transitions");
    const CYCLES: u64 = 64;
    group.throughput(Throughput::Elements(CYCLES));
    group.bench_function("show_poll_cycle", |b| {
        b.iter_batched(
            || registry(8),
            |mut scenes| {
                let mut now = 0;
                for i in 0..CYCLES {
                    let _ = scenes.show(&format!("scene-{}", i % 8), ms(now));
                    now += 200;
                    scenes.poll(ms(now));
                }
                black_box(scenes.host().ops);
            },
            BatchSize::SmallInput,
        );
    });
    group.bench_function("queued_burst", |b| {
        b.iter_batched(
            || registry(8),
            |mut scenes| {
                for i in 0..CYCLES {
                    let _ = scenes.show(&format!("/scene-{}", i % 8), ms(i));
                }
                scenes.poll(ms(10_000));
                black_box(scenes.current().map(|s| s.name().len()));
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize");
    const TICKS: u64 = 1000;
    group.throughput(Throughput::Elements(TICKS));
    group.bench_function("throttled_ticks", |b| {
        b.iter_batched(
            || registry(1),
            |mut scenes| {
                for t in 0..TICKS {
                    let w = 800.0 + (t % 400) as f64;
                    scenes.resize(Size::new(w, 900.0), ms(t * 4));
                    scenes.poll(ms(t * 4));
                }
                black_box(scenes.host().ops);
            },
            BatchSize::SmallInput,
        );
    });
    let ratio = AspectRatio::new(4, 3).unwrap();
    group.bench_function("fit", |b| {
        b.iter(|| {
            (0..TICKS)
                .map(|t| ratio.fit(Size::new(600.0 + t as f64, 900.0)).width)
                .sum::<f64>()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_registry, bench_transitions, bench_resize);
criterion_main!(benches);

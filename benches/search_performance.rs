use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flowless::buffer::LineStore;
use flowless::render::window::build_window;
use flowless::render::{ColorTheme, ViewState};
use flowless::search::{scan_backward, scan_forward, SearchOptions, SearchPattern};
use std::time::Duration;

/// Store with log-like lines; every `pattern_frequency`th line mentions a timeout.
fn log_store(lines: usize, pattern_frequency: usize) -> LineStore {
    let levels = ["DEBUG", "INFO", "WARN", "ERROR"];
    let services = ["auth", "database", "cache", "payment"];
    let store = LineStore::new(usize::MAX);

    for n in 0..lines {
        let level = levels[n % levels.len()];
        let service = services[n % services.len()];
        let text = if n % pattern_frequency == 0 {
            format!(
                "[2024-09-02T10:{:02}:{:02}] {level} {service}: Request {n} failed with timeout user_{}",
                (n / 60) % 60,
                n % 60,
                n % 1000
            )
        } else {
            format!(
                "[2024-09-02T10:{:02}:{:02}] {level} {service}: Request {n} processed\tuser_{}",
                (n / 60) % 60,
                n % 60,
                n % 1000
            )
        };
        store.append(text, None);
    }
    store.mark_eof();
    store
}

fn bench_scan_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_patterns");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(3));

    let literal = SearchOptions {
        regex: false,
        ..SearchOptions::default()
    };
    let ignore_case = SearchOptions {
        ignore_case: true,
        ..literal
    };
    let patterns = [
        ("literal", SearchPattern::compile("timeout", literal).unwrap()),
        (
            "regex",
            SearchPattern::compile(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:59", SearchOptions::default())
                .unwrap(),
        ),
        ("ignore_case", SearchPattern::compile("FAILED", ignore_case).unwrap()),
        ("absent", SearchPattern::compile("no such text", literal).unwrap()),
    ];

    for &lines in &[10_000, 100_000] {
        let store = log_store(lines, 100);
        for (name, pattern) in &patterns {
            group.bench_with_input(BenchmarkId::new(*name, lines), &store, |b, store| {
                b.iter(|| black_box(scan_forward(store, pattern, black_box(1))));
            });
        }
    }

    group.finish();
}

fn bench_search_navigation(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_navigation");
    group.sample_size(20);

    let store = log_store(100_000, 50);
    let pattern = SearchPattern::compile("timeout", SearchOptions::default()).unwrap();

    // `n` from the middle of the buffer
    group.bench_function("search_next", |b| {
        b.iter(|| black_box(scan_forward(&store, &pattern, black_box(50_001))));
    });
    // `p` from the middle of the buffer
    group.bench_function("search_prev", |b| {
        b.iter(|| black_box(scan_backward(&store, &pattern, black_box(49_999))));
    });

    group.finish();
}

fn bench_render_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_window");
    let store = log_store(1_000, 3);
    let theme = ColorTheme::default();
    let lines = store.range(0, 60);
    let len = store.len();

    let plain = ViewState::new(200, 61);
    let highlighted = ViewState {
        search: Some(SearchPattern::compile("user_\\d+", SearchOptions::default()).unwrap()),
        show_line_numbers: true,
        ..plain.clone()
    };
    let columns = ViewState {
        separate_columns: true,
        ..plain.clone()
    };

    for (name, view) in [("plain", &plain), ("highlighted", &highlighted), ("columns", &columns)] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(build_window(&lines, len, view, &theme)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_scan_patterns,
    bench_search_navigation,
    bench_render_window
);
criterion_main!(benches);

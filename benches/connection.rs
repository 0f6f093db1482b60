use criterion::{Criterion, criterion_group, criterion_main};
use pendler::prelude::*;
use std::{env, hint::black_box};

fn criterion_benchmark(c: &mut Criterion) {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            println!("Skipping benchmarks: {err}");
            return;
        }
    };
    let (Ok(from), Ok(to)) = (env::var("SEARCH_FROM"), env::var("SEARCH_TO")) else {
        println!("Skipping benchmarks: set SEARCH_FROM and SEARCH_TO to stop ids");
        return;
    };
    let departure = env::var("SEARCH_DEPARTURE")
        .ok()
        .and_then(|value| {
            chrono::NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(Instant::from_datetime)
        })
        .unwrap_or_else(|| Instant::from_datetime(chrono::Local::now().naive_local()));

    let is_zip = config
        .dataset_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    let gtfs = if is_zip {
        Gtfs::new()
            .from_zip(&config.dataset_path)
            .expect("Failed to open GTFS zip")
    } else {
        Gtfs::new().from_directory(&config.dataset_path)
    };
    let repository = Repository::new()
        .load_gtfs(gtfs, &config)
        .expect("Failed to build repository");

    let mut group = c.benchmark_group("Connection search");
    group.bench_function("solve", |b| {
        b.iter(|| {
            black_box(
                repository
                    .connection(&from, &to)
                    .departing_at(departure)
                    .within(config.max_search_time)
                    .solve(),
            )
        })
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

mod input;
mod render;

use pendler::{config::Config, gtfs::Gtfs, repository::Repository};
use std::{process, time::Instant};
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt().init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {err}");
            process::exit(1);
        }
    };

    info!("Loading dataset from {:?}...", config.dataset_path);
    let now = Instant::now();
    let is_zip = config
        .dataset_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    let gtfs = if is_zip {
        match Gtfs::new().from_zip(&config.dataset_path) {
            Ok(gtfs) => gtfs,
            Err(err) => {
                error!("Failed to open dataset: {err}");
                process::exit(1);
            }
        }
    } else {
        Gtfs::new().from_directory(&config.dataset_path)
    };
    let repository = match Repository::new().load_gtfs(gtfs, &config) {
        Ok(repository) => repository,
        Err(err) => {
            error!("Failed to load dataset: {err}");
            process::exit(1);
        }
    };
    info!("Loading data took {:?}", now.elapsed());

    loop {
        let Some(origin) = input::prompt_stop(&repository, "From") else {
            break;
        };
        let Some(destination) = input::prompt_stop(&repository, "To") else {
            break;
        };
        let Some(departure) = input::prompt_departure() else {
            break;
        };

        let result = repository
            .connection(&origin, &destination)
            .departing_at(departure)
            .within(config.max_search_time)
            .profiled(config.profile)
            .solve();
        match result {
            Ok(outcome) => render::outcome(&repository, &outcome),
            Err(err) => println!("{err}"),
        }
        println!();
    }
}

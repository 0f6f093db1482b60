use chrono::NaiveDate;
use pendler::{
    config::{Config, TransferMode},
    gtfs::Gtfs,
    repository::{Error, Repository, RouteKind},
    shared::time::{Duration, Instant, Time},
};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn toy_config(transfer_mode: TransferMode) -> Config {
    Config {
        transfer_mode,
        transfer_node_id: Some("transfer_node_id".into()),
        min_transfer_time: Duration::from_seconds(60),
        ..Config::new(fixture("toy"))
    }
}

fn load(name: &str, config: &Config) -> Result<Repository, Error> {
    let gtfs = Gtfs::new().from_directory(fixture(name));
    Repository::new().load_gtfs(gtfs, config)
}

fn load_toy(transfer_mode: TransferMode) -> Repository {
    load("toy", &toy_config(transfer_mode)).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(date: NaiveDate, hms: &str) -> Instant {
    Instant::from_service_day(date, Time::from_hms(hms).unwrap())
}

#[test]
fn lookups_resolve_external_ids() {
    let repository = load_toy(TransferMode::None);

    let stop = repository.stop_by_id("A").unwrap();
    assert_eq!(&*stop.name, "Alpha Square");
    assert!(repository.stop_by_id("nope").is_none());

    let trip = repository.trip_by_id("T1").unwrap();
    let route = &repository.routes[trip.route_idx as usize];
    assert_eq!(&*route.id, "R1");
    assert_eq!(route.kind, RouteKind::Bus);

    // 700 is an extended Google route type.
    assert_eq!(
        repository.route_by_id("R2").unwrap().kind,
        RouteKind::BusService
    );
}

#[test]
fn node_column_is_captured() {
    let repository = load_toy(TransferMode::ByNodeId);
    let b = repository.stop_by_id("B").unwrap();
    let bp = repository.stop_by_id("BP").unwrap();
    assert_eq!(b.node_id.as_deref(), Some("node_beacon"));
    assert_eq!(b.node_id, bp.node_id);
    assert!(repository.stop_by_id("A").unwrap().node_id.is_none());
}

#[test]
fn service_calendar_weekly_pattern_and_exceptions() {
    let repository = load_toy(TransferMode::None);
    let daily = repository.service_by_id("DAILY").unwrap();

    assert!(daily.runs_on(day(2025, 3, 3)));
    assert!(daily.runs_on(day(2026, 12, 31)));
    assert!(!daily.runs_on(day(2027, 1, 1)));
    assert!(!daily.runs_on(day(2024, 12, 31)));
    // Subtractive exception.
    assert!(!daily.runs_on(day(2025, 7, 4)));

    // Defined solely through calendar_dates.txt.
    let special = repository.service_by_id("SPECIAL").unwrap();
    assert!(special.runs_on(day(2025, 6, 1)));
    assert!(!special.runs_on(day(2025, 6, 2)));
}

#[test]
fn departures_are_ordered_and_service_filtered() {
    let repository = load_toy(TransferMode::None);
    let a = repository.stop_by_id("A").unwrap().index;

    let from = at(day(2025, 3, 3), "09:00:00");
    let departures: Vec<_> = repository
        .departures_at(a, from, from + Duration::from_hours(24))
        .collect();

    let instants: Vec<_> = departures.iter().map(|d| d.at).collect();
    let mut sorted = instants.clone();
    sorted.sort();
    assert_eq!(instants, sorted);

    // T5 09:50, T1 10:00, then the overnight T3 at 01:30 the next morning.
    assert_eq!(instants[0], at(day(2025, 3, 3), "09:50:00"));
    assert_eq!(instants[1], at(day(2025, 3, 3), "10:00:00"));
    assert_eq!(instants[2], at(day(2025, 3, 3), "25:30:00"));
    assert_eq!(instants[2], at(day(2025, 3, 4), "01:30:00"));
}

#[test]
fn overnight_departure_belongs_to_the_previous_service_day() {
    let repository = load_toy(TransferMode::None);
    let a = repository.stop_by_id("A").unwrap().index;

    // Shortly after midnight the 25:30 departure of yesterday's T3 is next.
    let from = at(day(2025, 3, 4), "00:30:00");
    let first = repository
        .departures_at(a, from, from + Duration::from_hours(2))
        .next()
        .unwrap();
    assert_eq!(first.at, at(day(2025, 3, 4), "01:30:00"));
    assert_eq!(&*repository.trips[first.trip_idx as usize].id, "T3");
}

#[test]
fn removed_service_day_yields_no_departures() {
    let repository = load_toy(TransferMode::None);
    let a = repository.stop_by_id("A").unwrap().index;

    let from = at(day(2025, 7, 4), "09:00:00");
    let next = repository
        .departures_at(a, from, from + Duration::from_hours(12))
        .next();
    assert!(next.is_none());
}

#[test]
fn node_groups_produce_symmetric_edges() {
    let repository = load_toy(TransferMode::ByNodeId);
    let b = repository.stop_by_id("B").unwrap().index;
    let bp = repository.stop_by_id("BP").unwrap().index;

    let from_b: Vec<_> = repository.transfers_from(b).collect();
    // Reflexive zero-cost edge first.
    assert_eq!(from_b[0].to_stop_idx, b);
    assert_eq!(from_b[0].duration, Duration::from_seconds(0));
    assert_eq!(from_b[1].to_stop_idx, bp);
    assert_eq!(from_b[1].duration, Duration::from_seconds(60));
    assert_eq!(from_b.len(), 2);

    let from_bp: Vec<_> = repository.transfers_from(bp).collect();
    assert!(
        from_bp
            .iter()
            .any(|t| t.to_stop_idx == b && t.duration == Duration::from_seconds(60))
    );

    // The node column plays no role for ungrouped stops.
    let a = repository.stop_by_id("A").unwrap().index;
    assert_eq!(repository.transfers_from(a).count(), 1);
}

#[test]
fn parent_station_mode_groups_by_parent() {
    let repository = load_toy(TransferMode::ByParentStation);
    let c = repository.stop_by_id("C").unwrap().index;
    let d = repository.stop_by_id("D").unwrap().index;

    let from_c: Vec<_> = repository.transfers_from(c).collect();
    assert_eq!(from_c.len(), 2);
    assert_eq!(from_c[1].to_stop_idx, d);

    // Node-keyed stops are not grouped in this mode.
    let b = repository.stop_by_id("B").unwrap().index;
    assert_eq!(repository.transfers_from(b).count(), 1);
}

#[test]
fn disabled_transfers_leave_only_the_self_edge() {
    let repository = load_toy(TransferMode::None);
    for stop in &repository.stops {
        let edges: Vec<_> = repository.transfers_from(stop.index).collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to_stop_idx, stop.index);
    }
}

#[test]
fn transfers_txt_applies_the_configured_minimum_and_drops_qualified_records() {
    let config = Config {
        transfer_mode: TransferMode::ByTransfersTxt,
        min_transfer_time: Duration::from_seconds(60),
        ..Config::new(fixture("walkway"))
    };
    let repository = load("walkway", &config).unwrap();

    let s2 = repository.stop_by_id("S2").unwrap().index;
    let s3 = repository.stop_by_id("S3").unwrap().index;
    let edges: Vec<_> = repository.transfers_from(s2).collect();
    // Self edge plus the one unqualified record; the trip-qualified
    // duplicate is ignored.
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[1].to_stop_idx, s3);
    assert_eq!(edges[1].duration, Duration::from_seconds(120));

    // The recorded minimum is raised to the configured floor.
    let raised = Config {
        min_transfer_time: Duration::from_seconds(300),
        ..config
    };
    let repository = load("walkway", &raised).unwrap();
    let edges: Vec<_> = repository.transfers_from(s2).collect();
    assert_eq!(edges[1].duration, Duration::from_seconds(300));
}

#[test]
fn no_pickup_rows_never_enter_the_departure_tables() {
    let config = Config {
        transfer_mode: TransferMode::ByTransfersTxt,
        ..Config::new(fixture("walkway"))
    };
    let repository = load("walkway", &config).unwrap();
    let s2 = repository.stop_by_id("S2").unwrap().index;

    let from = at(day(2025, 3, 4), "07:00:00");
    let next = repository
        .departures_at(s2, from, from + Duration::from_hours(24))
        .next();
    assert!(next.is_none());
}

#[test]
fn autocomplete_matches_prefixes_case_insensitively() {
    let repository = load_toy(TransferMode::None);

    let matches = repository.search_stops_by_name("bea");
    assert_eq!(matches.len(), 2);
    // Shortest name ranks first.
    assert_eq!(&*matches[0].name, "Beacon Street");
    assert_eq!(&*matches[1].name, "Beacon Street Platform");

    assert_eq!(repository.search_stops_by_name("ALPHA").len(), 1);
    assert!(repository.search_stops_by_name("street").is_empty());
}

#[test]
fn stop_time_at_walks_a_trip_in_order() {
    let repository = load_toy(TransferMode::None);
    let t1 = repository.trip_by_id("T1").unwrap().index;

    let run = repository.stop_times_of(t1);
    assert_eq!(run.len(), 3);
    assert!(run.windows(2).all(|w| w[0].sequence < w[1].sequence));

    let last = repository.stop_time_at(t1, 2).unwrap();
    assert_eq!(last.arrival, Time::from_hms("10:15:00").unwrap());
    assert!(repository.stop_time_at(t1, 3).is_none());
}

#[test]
fn node_mode_without_a_column_is_rejected() {
    let config = Config {
        transfer_mode: TransferMode::ByNodeId,
        ..Config::new(fixture("toy"))
    };
    assert!(matches!(
        load("toy", &config),
        Err(Error::MissingNodeColumn)
    ));
}

#[test]
fn load_reports_unknown_references() {
    let config = Config::new("");
    assert!(matches!(
        load("broken/unknown_stop", &config),
        Err(Error::UnknownStop { id, .. }) if id == "X"
    ));
    assert!(matches!(
        load("broken/unknown_service", &config),
        Err(Error::UnknownService { id, .. }) if id == "GHOST"
    ));
}

#[test]
fn load_reports_malformed_values() {
    let config = Config::new("");
    assert!(matches!(
        load("broken/bad_time", &config),
        Err(Error::InvalidTime { value, .. }) if value == "10:99:00"
    ));
    assert!(matches!(
        load("broken/bad_date", &config),
        Err(Error::InvalidDate { value, .. }) if value == "2025-01-01"
    ));
    assert!(matches!(
        load("broken/bad_route_type", &config),
        Err(Error::UnknownRouteType { code: 9999, .. })
    ));
    assert!(matches!(
        load("broken/unordered", &config),
        Err(Error::UnorderedStopTimes { trip }) if trip == "T1"
    ));
}

#[test]
fn load_rejects_unsupported_structural_features() {
    let config = Config::new("");
    assert!(matches!(
        load("broken/flex", &config),
        Err(Error::Unsupported(message)) if message.contains("location_id")
    ));
    assert!(matches!(
        load("broken/untimed", &config),
        Err(Error::Unsupported(message)) if message.contains("timepoint=0")
    ));
}

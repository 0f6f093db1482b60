use pendler::{
    repository::Repository,
    search::{Journey, SearchOutcome, Segment},
    shared::time::Duration,
};

pub fn outcome(repository: &Repository, outcome: &SearchOutcome) {
    match outcome {
        SearchOutcome::Connection(journey) => connection(repository, journey),
        SearchOutcome::NotFoundWithinHorizon => {
            println!("No connection found within the search horizon.");
        }
        SearchOutcome::OriginEqualsDestination => {
            println!("Origin and destination are the same stop.");
        }
    }
}

fn connection(repository: &Repository, journey: &Journey) {
    let (Some(departure), Some(arrival)) = (journey.departure(), journey.arrival()) else {
        return;
    };
    println!(
        "Departure {departure}, arrival {arrival}, {} transfer(s), {}.",
        journey.transfers(),
        format_duration(journey.duration().unwrap_or_default()),
    );
    for segment in &journey.segments {
        match *segment {
            Segment::Ride {
                trip_idx,
                board_stop_idx,
                alight_stop_idx,
                departure,
                arrival,
            } => {
                let trip = &repository.trips[trip_idx as usize];
                let route = &repository.routes[trip.route_idx as usize];
                println!(
                    "  {}  {}  {} -> {}  (arr {})",
                    departure.time_of_day(),
                    route.short_name,
                    repository.stops[board_stop_idx as usize].name,
                    repository.stops[alight_stop_idx as usize].name,
                    arrival.time_of_day(),
                );
            }
            Segment::Walk {
                from_stop_idx,
                to_stop_idx,
                departure,
                arrival,
            } => {
                println!(
                    "  {}  walk  {} -> {}  ({})",
                    departure.time_of_day(),
                    repository.stops[from_stop_idx as usize].name,
                    repository.stops[to_stop_idx as usize].name,
                    format_duration(arrival - departure),
                );
            }
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let total = duration.as_seconds();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours} h {minutes:02} min")
    } else if minutes > 0 {
        format!("{minutes} min")
    } else {
        format!("{seconds} s")
    }
}

use std::io::{self, Write};

use chrono::{Local, NaiveDateTime, NaiveTime};
use pendler::{repository::Repository, shared::time::Instant};

const MAX_SUGGESTIONS: usize = 8;

/// Prompts for a stop name prefix and resolves it through autocomplete.
/// Returns the chosen stop id, or `None` once stdin is closed.
pub fn prompt_stop(repository: &Repository, label: &str) -> Option<String> {
    loop {
        let line = read_line(&format!("{label}: "))?;
        let needle = line.trim();
        if needle.is_empty() {
            continue;
        }

        let matches = repository.search_stops_by_name(needle);
        match matches.len() {
            0 => println!("No stop matches {needle:?}."),
            1 => return Some(matches[0].id.to_string()),
            _ => {
                let shown = matches.len().min(MAX_SUGGESTIONS);
                for (i, stop) in matches[..shown].iter().enumerate() {
                    println!("  [{}] {}", i + 1, stop.name);
                }
                if matches.len() > shown {
                    println!("  ... and {} more", matches.len() - shown);
                }
                let pick = read_line(&format!("Pick [1-{shown}]: "))?;
                if let Ok(i) = pick.trim().parse::<usize>()
                    && (1..=shown).contains(&i)
                {
                    return Some(matches[i - 1].id.to_string());
                }
                println!("Not a valid pick.");
            }
        }
    }
}

/// Prompts for the departure date and time. An empty line means now.
pub fn prompt_departure() -> Option<Instant> {
    loop {
        let line = read_line("Departure (e.g. 31.12.2025 14:30, empty = now): ")?;
        let text = line.trim();
        if text.is_empty() {
            return Some(Instant::from_datetime(Local::now().naive_local()));
        }
        if let Some(datetime) = parse_datetime(text) {
            return Some(Instant::from_datetime(datetime));
        }
        println!("Could not read {text:?} as a date and time.");
    }
}

/// Accepts the common European written forms; a bare time means today.
fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 7] = [
        "%d.%m.%Y %H:%M:%S",
        "%d.%m.%Y %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d.%m.%y %H:%M",
    ];
    for format in FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime);
        }
    }
    for format in ["%H:%M:%S", "%H:%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(text, format) {
            return Some(Local::now().date_naive().and_time(time));
        }
    }
    None
}

fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    io::stdout().flush().ok()?;
    let mut buffer = String::new();
    let read = io::stdin().read_line(&mut buffer).ok()?;
    (read > 0).then_some(buffer)
}

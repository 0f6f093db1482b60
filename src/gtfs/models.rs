use std::collections::HashMap;

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct GtfsStop {
    pub stop_id: String,
    pub stop_name: String,
    pub parent_station: Option<String>,
    /// Every remaining column keyed by header, including the configured
    /// transfer-node column whose name is only known at runtime.
    #[serde(flatten)]
    pub extra: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GtfsRoute {
    pub route_id: String,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    pub route_type: i32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GtfsTrip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GtfsStopTime {
    pub trip_id: String,
    pub stop_sequence: u32,
    pub stop_id: Option<String>,
    pub location_id: Option<String>,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    pub pickup_type: Option<u8>,
    pub drop_off_type: Option<u8>,
    pub timepoint: Option<u8>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GtfsCalendar {
    pub service_id: String,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GtfsCalendarDate {
    pub service_id: String,
    pub date: String,
    pub exception_type: u8,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GtfsTransfer {
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub transfer_type: Option<u8>,
    pub min_transfer_time: Option<u32>,
    pub from_trip_id: Option<String>,
    pub to_trip_id: Option<String>,
    pub from_route_id: Option<String>,
    pub to_route_id: Option<String>,
}

impl GtfsTransfer {
    /// Records qualified by trip or route only constrain specific
    /// connections and are not plain walking edges.
    pub fn is_qualified(&self) -> bool {
        let filled = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.is_empty());
        filled(&self.from_trip_id)
            || filled(&self.to_trip_id)
            || filled(&self.from_route_id)
            || filled(&self.to_route_id)
    }
}

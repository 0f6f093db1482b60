/// File names of the tables inside a GTFS bundle.
pub struct Files {
    pub stops: String,
    pub routes: String,
    pub trips: String,
    pub stop_times: String,
    pub calendar: String,
    pub calendar_dates: String,
    pub transfers: String,
}

impl Default for Files {
    fn default() -> Self {
        Self {
            stops: "stops.txt".into(),
            routes: "routes.txt".into(),
            trips: "trips.txt".into(),
            stop_times: "stop_times.txt".into(),
            calendar: "calendar.txt".into(),
            calendar_dates: "calendar_dates.txt".into(),
            transfers: "transfers.txt".into(),
        }
    }
}

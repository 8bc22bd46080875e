//! Synthetic feed builder shared by the integration tests. Writes a small
//! on-disk GTFS-style directory via `tempfile` and builds an `Index` from it.

use raptor_transit::index::Index;
use tempfile::TempDir;

#[derive(Default)]
pub struct Feed {
    stops: Vec<(i64, f64, f64)>,
    routes: Vec<String>,
    trips: Vec<(String, String)>,
    stop_times: Vec<(String, i64, u32, String, String)>,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(mut self, id: i64, lat: f64, lon: f64) -> Self {
        self.stops.push((id, lat, lon));
        self
    }

    pub fn route(mut self, id: &str) -> Self {
        self.routes.push(id.to_string());
        self
    }

    pub fn trip(mut self, route_id: &str, trip_id: &str) -> Self {
        self.trips.push((route_id.to_string(), trip_id.to_string()));
        self
    }

    pub fn stop_time(mut self, trip_id: &str, stop_id: i64, sequence: u32, arrival: &str, departure: &str) -> Self {
        self.stop_times.push((trip_id.to_string(), stop_id, sequence, arrival.to_string(), departure.to_string()));
        self
    }

    fn write(&self, dir: &std::path::Path) {
        let mut stops = String::from("stop_id,stop_lat,stop_lon\n");
        for (id, lat, lon) in &self.stops {
            stops.push_str(&format!("{id},{lat},{lon}\n"));
        }
        std::fs::write(dir.join("stops.txt"), stops).unwrap();

        let mut routes = String::from("route_id\n");
        for route_id in &self.routes {
            routes.push_str(&format!("{route_id}\n"));
        }
        std::fs::write(dir.join("routes.txt"), routes).unwrap();

        let mut trips = String::from("route_id,trip_id\n");
        for (route_id, trip_id) in &self.trips {
            trips.push_str(&format!("{route_id},{trip_id}\n"));
        }
        std::fs::write(dir.join("trips.txt"), trips).unwrap();

        let mut stop_times = String::from("trip_id,arrival_time,departure_time,stop_id,stop_sequence\n");
        for (trip_id, stop_id, sequence, arrival, departure) in &self.stop_times {
            stop_times.push_str(&format!("{trip_id},{arrival},{departure},{stop_id},{sequence}\n"));
        }
        std::fs::write(dir.join("stop_times.txt"), stop_times).unwrap();
    }

    /// Writes the feed to a temporary directory and builds an `Index` from
    /// it. The `TempDir` must be kept alive for as long as `Index` might
    /// need to be rebuilt from the same files.
    pub fn build(&self) -> (TempDir, Index) {
        let dir = TempDir::new().expect("failed to create temp dir for synthetic feed");
        self.write(dir.path());
        let index = raptor_transit::index::build(dir.path()).expect("synthetic feed should build cleanly");
        (dir, index)
    }

    pub fn dir(&self) -> TempDir {
        let dir = TempDir::new().expect("failed to create temp dir for synthetic feed");
        self.write(dir.path());
        dir
    }
}

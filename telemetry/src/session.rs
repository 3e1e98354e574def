use crate::SessionError;

use serde::Deserialize;
use std::path::Path;

/// One car-data sample as recorded by the logger.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CarSample {
    pub time_ms: u64,
    pub speed_kmh: f32,
}

/// A single timed lap with its recorded car data.
#[derive(Debug, Clone, Deserialize)]
pub struct Lap {
    pub driver: String,
    pub lap_time_ms: u64,
    pub samples: Vec<CarSample>,
}

impl Lap {
    /// Traversed distance per sample in meters, the cumulative sum of
    /// `speed / 3.6 * dt` over the lap. The first sample sits at zero.
    pub fn distances(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.samples.len());
        let mut dist = 0.0f32;
        let mut prev_ms = self.samples.first().map_or(0, |s| s.time_ms);

        for sample in &self.samples {
            let dt = sample.time_ms.saturating_sub(prev_ms) as f32 / 1000.0;
            dist += sample.speed_kmh / 3.6 * dt;
            out.push(dist);
            prev_ms = sample.time_ms;
        }
        out
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Corner {
    pub distance: f32,
    pub number: u32,
    #[serde(default)]
    pub letter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Circuit {
    pub name: String,
    #[serde(default)]
    pub corners: Vec<Corner>,
}

/// A recorded session: event metadata, circuit info and every timed lap.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub year: u16,
    pub grand_prix: String,
    pub session: String,
    pub circuit: Circuit,
    pub laps: Vec<Lap>,
}

impl Session {
    pub fn from_path(path: &Path) -> Result<Self, SessionError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let session: Session = serde_json::from_str(&raw)?;

        log::info!(
            "loaded {} {} {}: {} laps at {}",
            session.year,
            session.grand_prix,
            session.session,
            session.laps.len(),
            session.circuit.name,
        );
        Ok(session)
    }

    /// The driver's fastest usable lap. Laps with fewer than two samples
    /// cannot be interpolated and are skipped.
    pub fn fastest_lap(&self, driver: &str) -> Result<&Lap, SessionError> {
        self.laps
            .iter()
            .filter(|lap| lap.driver == driver && lap.samples.len() >= 2)
            .min_by_key(|lap| lap.lap_time_ms)
            .ok_or_else(|| SessionError::DataUnavailable(driver.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> Session {
        serde_json::from_str(
            r#"{
                "year": 2024,
                "grand_prix": "Chinese Grand Prix",
                "session": "Q",
                "circuit": {
                    "name": "Shanghai International Circuit",
                    "corners": [
                        { "distance": 310.0, "number": 1, "letter": "" },
                        { "distance": 345.0, "number": 2, "letter": "A" }
                    ]
                },
                "laps": [
                    {
                        "driver": "BOT",
                        "lap_time_ms": 95000,
                        "samples": [
                            { "time_ms": 0, "speed_kmh": 36.0 },
                            { "time_ms": 1000, "speed_kmh": 36.0 },
                            { "time_ms": 2000, "speed_kmh": 72.0 }
                        ]
                    },
                    {
                        "driver": "BOT",
                        "lap_time_ms": 94000,
                        "samples": [
                            { "time_ms": 0, "speed_kmh": 40.0 },
                            { "time_ms": 1000, "speed_kmh": 50.0 }
                        ]
                    },
                    {
                        "driver": "ZHO",
                        "lap_time_ms": 93000,
                        "samples": [
                            { "time_ms": 0, "speed_kmh": 30.0 }
                        ]
                    },
                    {
                        "driver": "ZHO",
                        "lap_time_ms": 96000,
                        "samples": [
                            { "time_ms": 0, "speed_kmh": 30.0 },
                            { "time_ms": 1000, "speed_kmh": 30.0 }
                        ]
                    }
                ]
            }"#,
        )
        .expect("session fixture parses")
    }

    #[test]
    fn fastest_lap_picks_minimum_lap_time() {
        let session = sample_session();
        let lap = session.fastest_lap("BOT").expect("BOT has laps");
        assert_eq!(lap.lap_time_ms, 94000);
    }

    #[test]
    fn fastest_lap_skips_laps_too_short_to_interpolate() {
        let session = sample_session();
        // ZHO's quickest lap has a single sample and must not be chosen.
        let lap = session.fastest_lap("ZHO").expect("ZHO has a usable lap");
        assert_eq!(lap.lap_time_ms, 96000);
    }

    #[test]
    fn fastest_lap_fails_for_unknown_driver() {
        let session = sample_session();
        let err = session.fastest_lap("VER").unwrap_err();
        assert!(matches!(err, SessionError::DataUnavailable(d) if d == "VER"));
    }

    #[test]
    fn distances_integrate_speed_over_time() {
        let session = sample_session();
        let lap = &session.laps[0];
        let distances = lap.distances();

        // 36 km/h is 10 m/s, 72 km/h is 20 m/s; one second between samples.
        assert_eq!(distances, vec![0.0, 10.0, 30.0]);
    }

    #[test]
    fn distances_of_empty_lap_are_empty() {
        let lap = Lap {
            driver: "BOT".to_string(),
            lap_time_ms: 0,
            samples: Vec::new(),
        };
        assert!(lap.distances().is_empty());
    }
}

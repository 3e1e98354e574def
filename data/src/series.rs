use crate::annotate::ValueRange;
use crate::{TraceError, theme};

use iced_core::Color;
use telemetry::Session;

use std::fmt;

/// One telemetry sample: traversed distance (m) against speed (km/h).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub distance: f32,
    pub speed: f32,
}

/// Distance interval covered by a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: f32,
    pub max: f32,
}

impl Domain {
    pub fn span(self) -> f32 {
        self.max - self.min
    }

    /// Intersection of two domains, `None` when empty or degenerate.
    pub fn intersect(self, other: Domain) -> Option<Domain> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min < max).then_some(Domain { min, max })
    }

    pub fn clamp(self, distance: f32) -> f32 {
        distance.clamp(self.min, self.max)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}..{:.1} m", self.min, self.max)
    }
}

/// One driver's fastest-lap speed trace.
///
/// Samples are ordered by distance and fixed once loaded; nothing mutates a
/// series for the lifetime of a visualization.
#[derive(Debug, Clone)]
pub struct Series {
    driver: String,
    color: Color,
    samples: Vec<Sample>,
}

impl Series {
    pub fn new(driver: String, color: Color, samples: Vec<Sample>) -> Self {
        Self {
            driver,
            color,
            samples,
        }
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Distance interval covered by the samples. Degenerate (`min == max`)
    /// when the series has fewer than two samples.
    pub fn domain(&self) -> Domain {
        Domain {
            min: self.samples.first().map_or(0.0, |s| s.distance),
            max: self.samples.last().map_or(0.0, |s| s.distance),
        }
    }

    pub fn speed_range(&self) -> Option<ValueRange> {
        let mut samples = self.samples.iter();
        let first = samples.next()?;
        let mut range = ValueRange {
            min: first.speed,
            max: first.speed,
        };
        for sample in samples {
            range.min = range.min.min(sample.speed);
            range.max = range.max.max(sample.speed);
        }
        Some(range)
    }
}

/// The loaded series for the compared drivers, read-only for the lifetime
/// of the session view.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    series: Vec<Series>,
}

impl SeriesStore {
    /// Builds one series per driver from its fastest lap, coloring each
    /// from the override list or the default palette in driver order.
    ///
    /// Fails with the driver id when no lap with at least two samples
    /// exists for that driver.
    pub fn load(
        session: &Session,
        drivers: &[String],
        color_overrides: &[(String, Color)],
    ) -> Result<Self, TraceError> {
        let mut series = Vec::with_capacity(drivers.len());

        for (i, driver) in drivers.iter().enumerate() {
            let lap = session.fastest_lap(driver)?;
            let samples: Vec<Sample> = lap
                .samples
                .iter()
                .zip(lap.distances())
                .map(|(s, distance)| Sample {
                    distance,
                    speed: s.speed_kmh,
                })
                .collect();

            let color = color_overrides
                .iter()
                .find(|(code, _)| code == driver)
                .map_or_else(|| theme::series_color(i), |(_, color)| *color);

            let loaded = Series::new(lap.driver.clone(), color, samples);
            log::debug!(
                "loaded fastest lap for {driver}: {} samples over {}",
                loaded.samples().len(),
                loaded.domain(),
            );
            series.push(loaded);
        }

        Ok(Self { series })
    }

    pub fn all(&self) -> &[Series] {
        &self.series
    }

    /// The two compared series, when exactly two drivers were loaded.
    /// The interactive diff path is only defined for a pair.
    pub fn pair(&self) -> Option<(&Series, &Series)> {
        match self.series.as_slice() {
            [a, b] => Some((a, b)),
            _ => None,
        }
    }

    /// Observed speed extent across every loaded series.
    pub fn speed_range(&self) -> Option<ValueRange> {
        let mut ranges = self.series.iter().filter_map(Series::speed_range);
        let mut total = ranges.next()?;
        for range in ranges {
            total.min = total.min.min(range.min);
            total.max = total.max.max(range.max);
        }
        Some(total)
    }

    /// The x-axis upper bound: the longest lap's end distance.
    pub fn track_length(&self) -> f32 {
        self.series
            .iter()
            .map(|s| s.domain().max)
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(samples: &[(f32, f32)]) -> Series {
        Series::new(
            "BOT".to_string(),
            Color::WHITE,
            samples
                .iter()
                .map(|&(distance, speed)| Sample { distance, speed })
                .collect(),
        )
    }

    #[test]
    fn domain_spans_first_to_last_sample() {
        let s = series(&[(5.0, 100.0), (120.0, 180.0), (300.0, 150.0)]);
        assert_eq!(s.domain(), Domain { min: 5.0, max: 300.0 });
    }

    #[test]
    fn intersect_overlapping_domains() {
        let a = Domain { min: 0.0, max: 200.0 };
        let b = Domain { min: 50.0, max: 300.0 };
        assert_eq!(a.intersect(b), Some(Domain { min: 50.0, max: 200.0 }));
    }

    #[test]
    fn intersect_disjoint_or_degenerate_is_none() {
        let a = Domain { min: 0.0, max: 100.0 };
        let b = Domain { min: 150.0, max: 300.0 };
        assert_eq!(a.intersect(b), None);

        let touching = Domain { min: 100.0, max: 200.0 };
        assert_eq!(a.intersect(touching), None);
    }

    #[test]
    fn speed_range_covers_extremes() {
        let s = series(&[(0.0, 100.0), (100.0, 210.0), (200.0, 90.0)]);
        assert_eq!(s.speed_range(), Some(ValueRange { min: 90.0, max: 210.0 }));
    }
}

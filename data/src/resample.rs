use crate::TraceError;
use crate::series::{Domain, Sample, Series};

pub const DEFAULT_GRID_SIZE: usize = 1000;

/// Evenly spaced distance grid over the intersection of two domains.
///
/// The first point equals the shared lower bound and the last the shared
/// upper bound. Fails when the domains do not overlap or the overlap is
/// degenerate.
pub fn build_grid(a: Domain, b: Domain, grid_size: usize) -> Result<Vec<f32>, TraceError> {
    let shared = a.intersect(b).ok_or(TraceError::EmptyOverlap { a, b })?;

    let n = grid_size.max(2);
    let step = shared.span() / (n - 1) as f32;

    let mut grid = Vec::with_capacity(n);
    for i in 0..n {
        grid.push(shared.min + step * i as f32);
    }
    // The last point must hit the upper bound exactly.
    grid[n - 1] = shared.max;

    Ok(grid)
}

/// Piecewise-linear interpolation of a series at one distance, with
/// clamped ends: distances before the first sample read as the first
/// sample's speed, past the last as the last sample's speed.
///
/// `None` only for an empty series. O(log n) per call.
pub fn query_point(samples: &[Sample], distance: f32) -> Option<f32> {
    if samples.is_empty() {
        return None;
    }
    let idx_right = samples.partition_point(|s| s.distance < distance);
    Some(interpolate_at(samples, idx_right, distance))
}

/// Values of a series at every grid point. Agrees exactly with
/// [`query_point`] at each index; `None` only for an empty series.
pub fn resample_to_grid(samples: &[Sample], grid: &[f32]) -> Option<Vec<f32>> {
    if samples.is_empty() {
        return None;
    }
    let mut hint = QueryHint::default();
    Some(
        grid.iter()
            .map(|&d| {
                let idx_right = hint.bracket(samples, d);
                interpolate_at(samples, idx_right, d)
            })
            .collect(),
    )
}

/// `idx_right` is the partition point of `distance`: the index of the
/// first sample at or past it.
fn interpolate_at(samples: &[Sample], idx_right: usize, distance: f32) -> f32 {
    if idx_right == 0 {
        samples[0].speed
    } else if idx_right == samples.len() {
        samples[samples.len() - 1].speed
    } else {
        let s0 = samples[idx_right - 1];
        let s1 = samples[idx_right];
        let dx = s1.distance - s0.distance;
        if dx > 0.0 {
            s0.speed + (s1.speed - s0.speed) * ((distance - s0.distance) / dx)
        } else {
            s0.speed
        }
    }
}

/// Bracket cache for repeated point queries.
///
/// Pointer-driven queries are usually spatially coherent, so the previous
/// bracket or an adjacent one is tried first; arbitrary jumps fall back to
/// a binary search. Results are identical to [`query_point`] either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryHint {
    idx_right: usize,
}

impl QueryHint {
    pub fn query(&mut self, samples: &[Sample], distance: f32) -> Option<f32> {
        if samples.is_empty() {
            return None;
        }
        let idx_right = self.bracket(samples, distance);
        Some(interpolate_at(samples, idx_right, distance))
    }

    fn bracket(&mut self, samples: &[Sample], distance: f32) -> usize {
        let n = samples.len();
        let is_partition = |i: usize| {
            (i == 0 || samples[i - 1].distance < distance)
                && (i == n || samples[i].distance >= distance)
        };

        let cached = self.idx_right.min(n);
        let idx_right = if is_partition(cached) {
            cached
        } else if cached < n && is_partition(cached + 1) {
            cached + 1
        } else if cached > 0 && is_partition(cached - 1) {
            cached - 1
        } else {
            samples.partition_point(|s| s.distance < distance)
        };

        self.idx_right = idx_right;
        idx_right
    }
}

/// Two speed columns aligned to a shared distance grid, plus their
/// pointwise difference. Built once per compared pair, read-only after;
/// rebuild only when the source series change.
#[derive(Debug, Clone)]
pub struct ResampledPair {
    grid: Vec<f32>,
    speeds_a: Vec<f32>,
    speeds_b: Vec<f32>,
    delta: Vec<f32>,
}

impl ResampledPair {
    pub fn build(a: &Series, b: &Series, grid_size: usize) -> Result<Self, TraceError> {
        let grid = build_grid(a.domain(), b.domain(), grid_size)?;

        // A non-degenerate overlap implies both series are non-empty.
        let (Some(speeds_a), Some(speeds_b)) = (
            resample_to_grid(a.samples(), &grid),
            resample_to_grid(b.samples(), &grid),
        ) else {
            return Err(TraceError::EmptyOverlap {
                a: a.domain(),
                b: b.domain(),
            });
        };

        let delta = speeds_a
            .iter()
            .zip(&speeds_b)
            .map(|(va, vb)| va - vb)
            .collect();

        Ok(Self {
            grid,
            speeds_a,
            speeds_b,
            delta,
        })
    }

    pub fn grid(&self) -> &[f32] {
        &self.grid
    }

    pub fn speeds(&self) -> (&[f32], &[f32]) {
        (&self.speeds_a, &self.speeds_b)
    }

    pub fn delta(&self) -> &[f32] {
        &self.delta
    }

    /// The largest absolute speed difference and the distance where it
    /// occurs.
    pub fn max_delta(&self) -> Option<(f32, f32)> {
        self.grid
            .iter()
            .zip(&self.delta)
            .max_by(|(_, x), (_, y)| x.abs().total_cmp(&y.abs()))
            .map(|(&d, &delta)| (d, delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced_core::Color;

    fn series(samples: &[(f32, f32)]) -> Series {
        Series::new(
            "TST".to_string(),
            Color::WHITE,
            samples
                .iter()
                .map(|&(distance, speed)| Sample { distance, speed })
                .collect(),
        )
    }

    fn series_a() -> Series {
        series(&[(0.0, 100.0), (100.0, 200.0), (200.0, 150.0)])
    }

    fn series_b() -> Series {
        series(&[(0.0, 90.0), (100.0, 210.0), (200.0, 140.0)])
    }

    #[test]
    fn grid_is_strictly_increasing_and_hits_both_bounds() {
        let a = Domain { min: 0.0, max: 200.0 };
        let b = Domain { min: 50.0, max: 250.0 };
        let grid = build_grid(a, b, 1000).expect("domains overlap");

        assert_eq!(grid.len(), 1000);
        assert_eq!(grid[0], 50.0);
        assert_eq!(grid[999], 200.0);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn grid_fails_on_disjoint_domains() {
        let a = Domain { min: 0.0, max: 100.0 };
        let b = Domain { min: 200.0, max: 300.0 };
        let err = build_grid(a, b, 1000).unwrap_err();
        assert!(matches!(err, TraceError::EmptyOverlap { .. }));
    }

    #[test]
    fn query_is_exact_at_sample_distances() {
        let s = series_a();
        assert_eq!(query_point(s.samples(), 0.0), Some(100.0));
        assert_eq!(query_point(s.samples(), 100.0), Some(200.0));
        assert_eq!(query_point(s.samples(), 200.0), Some(150.0));
    }

    #[test]
    fn query_interpolates_between_samples() {
        let a = series_a();
        let b = series_b();
        assert_eq!(query_point(a.samples(), 50.0), Some(150.0));
        assert_eq!(query_point(b.samples(), 50.0), Some(150.0));
        assert_eq!(query_point(a.samples(), 150.0), Some(175.0));
        assert_eq!(query_point(b.samples(), 150.0), Some(175.0));
    }

    #[test]
    fn query_stays_between_bracketing_samples() {
        let s = series(&[(0.0, 80.0), (60.0, 120.0), (90.0, 95.0)]);
        for d in [10.0f32, 30.0, 59.0, 61.0, 75.0, 89.5] {
            let v = query_point(s.samples(), d).unwrap();
            assert!((80.0..=120.0).contains(&v), "query at {d} gave {v}");
        }
    }

    #[test]
    fn query_clamps_outside_the_domain() {
        let s = series_a();
        assert_eq!(
            query_point(s.samples(), -50.0),
            query_point(s.samples(), 0.0)
        );
        assert_eq!(
            query_point(s.samples(), 900.0),
            query_point(s.samples(), 200.0)
        );
    }

    #[test]
    fn query_of_empty_series_is_none() {
        assert_eq!(query_point(&[], 10.0), None);
    }

    #[test]
    fn batch_and_point_queries_agree() {
        let a = series_a();
        let grid = build_grid(a.domain(), series_b().domain(), 257).unwrap();
        let batch = resample_to_grid(a.samples(), &grid).unwrap();

        assert_eq!(batch.len(), grid.len());
        for (i, &d) in grid.iter().enumerate() {
            assert_eq!(Some(batch[i]), query_point(a.samples(), d));
        }
    }

    #[test]
    fn hint_agrees_with_query_on_arbitrary_jumps() {
        let s = series(&[
            (0.0, 10.0),
            (25.0, 40.0),
            (50.0, 20.0),
            (100.0, 90.0),
            (160.0, 55.0),
        ]);
        let mut hint = QueryHint::default();

        // Coherent sweep, then jumps to either end.
        for d in [5.0f32, 6.0, 7.0, 30.0, 31.0, 155.0, 2.0, 99.0, 100.0, 0.0] {
            assert_eq!(hint.query(s.samples(), d), query_point(s.samples(), d));
        }
    }

    #[test]
    fn pair_delta_matches_worked_example() {
        let pair = ResampledPair::build(&series_a(), &series_b(), 5).unwrap();

        assert_eq!(pair.grid(), &[0.0, 50.0, 100.0, 150.0, 200.0]);
        let (speeds_a, speeds_b) = pair.speeds();
        assert_eq!(speeds_a[1], 150.0);
        assert_eq!(speeds_b[1], 150.0);
        assert_eq!(pair.delta(), &[10.0, 0.0, -10.0, 0.0, 10.0]);
    }

    #[test]
    fn max_delta_reports_largest_gap() {
        let pair = ResampledPair::build(&series_a(), &series_b(), 5).unwrap();
        let (_, delta) = pair.max_delta().unwrap();
        assert_eq!(delta.abs(), 10.0);
    }

    #[test]
    fn pair_build_fails_without_overlap() {
        let a = series(&[(0.0, 100.0), (100.0, 150.0)]);
        let b = series(&[(300.0, 90.0), (400.0, 140.0)]);
        let err = ResampledPair::build(&a, &b, 100).unwrap_err();
        assert!(matches!(err, TraceError::EmptyOverlap { .. }));
    }
}

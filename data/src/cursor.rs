use crate::resample::QueryHint;
use crate::series::Series;

/// Live values under the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readout {
    pub distance: f32,
    pub speeds: (f32, f32),
    pub delta: f32,
}

impl Readout {
    /// The four readout lines, one decimal place with units.
    pub fn lines(&self, driver_a: &str, driver_b: &str) -> [String; 4] {
        [
            format!("Distance: {:.1} m", self.distance),
            format!("{driver_a} Speed: {:.1} km/h", self.speeds.0),
            format!("{driver_b} Speed: {:.1} km/h", self.speeds.1),
            format!("Speed Difference: {:.1} km/h", self.delta),
        ]
    }
}

/// Pointer-driven cursor over the shared distance axis.
///
/// Starts idle with no indicator. The first pointer event inside the plot
/// makes it active and it stays active; events outside the plot are
/// ignored and out-of-range distances are clamped into
/// `[0, track_length]`. Malformed pointer input is never an error.
///
/// `track_length` is the longer lap's end distance (the plot's x-limit),
/// so past a shorter lap's last sample its query reads as that lap's
/// final speed.
#[derive(Debug, Clone)]
pub struct Crosshair {
    track_length: f32,
    cursor: Option<f32>,
    readout: Option<Readout>,
    hint_a: QueryHint,
    hint_b: QueryHint,
}

impl Crosshair {
    pub fn new(track_length: f32) -> Self {
        Self {
            track_length,
            cursor: None,
            readout: None,
            hint_a: QueryHint::default(),
            hint_b: QueryHint::default(),
        }
    }

    pub fn track_length(&self) -> f32 {
        self.track_length
    }

    /// Indicator position, `None` before the first in-plot pointer event.
    pub fn position(&self) -> Option<f32> {
        self.cursor
    }

    pub fn readout(&self) -> Option<Readout> {
        self.readout
    }

    /// Handles one pointer-move event.
    ///
    /// `None` (pointer outside the plot) and non-finite coordinates leave
    /// the cursor untouched and request no redraw. Otherwise the distance
    /// is clamped, both series are queried there, and the fresh readout is
    /// returned for display.
    pub fn on_pointer_move(
        &mut self,
        raw: Option<f32>,
        a: &Series,
        b: &Series,
    ) -> Option<Readout> {
        let raw = raw.filter(|d| d.is_finite())?;
        let distance = raw.clamp(0.0, self.track_length);

        let speed_a = self.hint_a.query(a.samples(), distance)?;
        let speed_b = self.hint_b.query(b.samples(), distance)?;

        let readout = Readout {
            distance,
            speeds: (speed_a, speed_b),
            delta: speed_a - speed_b,
        };
        self.cursor = Some(distance);
        self.readout = Some(readout);
        Some(readout)
    }

    /// Union-style x-limit for a compared pair.
    pub fn track_length_of(a: &Series, b: &Series) -> f32 {
        a.domain().max.max(b.domain().max)
    }
}

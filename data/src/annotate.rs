use telemetry::Corner;

pub const DEFAULT_MARKER_PAD: f32 = 20.0;

/// How far below the padded line end a corner label sits, in speed units.
const LABEL_DROP: f32 = 10.0;

/// Observed speed extent across the plotted series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

/// A corner resolved to plot coordinates: a vertical line spanning the
/// padded speed range and a label centered below it.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerMarker {
    pub distance: f32,
    pub line_min: f32,
    pub line_max: f32,
    pub label: String,
    pub label_y: f32,
}

/// Pure function of the corner set and the speed range; recompute only
/// when either changes. An empty corner set yields no markers.
pub fn compute_markers(corners: &[Corner], range: ValueRange, pad: f32) -> Vec<CornerMarker> {
    corners
        .iter()
        .map(|corner| CornerMarker {
            distance: corner.distance,
            line_min: range.min - pad,
            line_max: range.max + pad,
            label: format!("{}{}", corner.number, corner.letter),
            label_y: range.min - pad - LABEL_DROP,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(distance: f32, number: u32, letter: &str) -> Corner {
        Corner {
            distance,
            number,
            letter: letter.to_string(),
        }
    }

    #[test]
    fn markers_span_the_padded_range_with_labels_below() {
        let corners = [corner(50.0, 1, "A"), corner(150.0, 2, "B")];
        let range = ValueRange { min: 90.0, max: 210.0 };

        let markers = compute_markers(&corners, range, 20.0);

        assert_eq!(markers.len(), 2);
        for marker in &markers {
            assert_eq!(marker.line_min, 70.0);
            assert_eq!(marker.line_max, 230.0);
            assert_eq!(marker.label_y, 60.0);
        }
        assert_eq!(markers[0].distance, 50.0);
        assert_eq!(markers[0].label, "1A");
        assert_eq!(markers[1].distance, 150.0);
        assert_eq!(markers[1].label, "2B");
    }

    #[test]
    fn corner_without_letter_keeps_plain_number() {
        let markers = compute_markers(
            &[corner(310.0, 14, "")],
            ValueRange { min: 0.0, max: 100.0 },
            20.0,
        );
        assert_eq!(markers[0].label, "14");
    }

    #[test]
    fn empty_corner_set_yields_no_markers() {
        let markers = compute_markers(&[], ValueRange { min: 0.0, max: 1.0 }, 20.0);
        assert!(markers.is_empty());
    }
}

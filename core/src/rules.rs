use serde::{Deserialize, Serialize};

/// Neighbor snap distance, in canvas pixels.
pub const SNAP_TOLERANCE_PX: f32 = 18.0;
/// Per-piece slack allowed by progress and completion detection.
pub const DETECTION_TOLERANCE_PX: f32 = 10.0;
/// Highlight radius while dragging, as a multiple of the snap tolerance.
pub const PRE_SNAP_MULTIPLIER: f32 = 2.0;
/// A piece closer than this to its home rectangle counts as exactly placed.
pub const EXACT_SNAP_TOLERANCE_PX: f32 = 2.0;
/// Gap kept between shuffled pieces and the board edge.
pub const SHUFFLE_MARGIN_PX: f32 = 12.0;

pub const READY_TIMEOUT_MS: u32 = 5000;

/// Every tolerance the alignment detector and drag controller consult.
///
/// All distances are canvas pixels (backing-store pixels, not CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRules {
    /// Max gap mismatch for the neighbor snap assist while dragging.
    #[serde(default = "default_snap_tolerance")]
    pub snap_tolerance_px: f32,
    /// Max deviation from the consensus offset for a piece to count as aligned.
    #[serde(default = "default_detection_tolerance")]
    pub detection_tolerance_px: f32,
    /// `snap_tolerance_px * pre_snap_multiplier` is the home highlight radius.
    #[serde(default = "default_pre_snap_multiplier")]
    pub pre_snap_multiplier: f32,
    /// Max deviation from the absolute home position to count as exactly placed.
    #[serde(default = "default_exact_tolerance")]
    pub exact_tolerance_px: f32,
    /// Distance kept from the board edges when shuffling.
    #[serde(default = "default_shuffle_margin")]
    pub shuffle_margin_px: f32,
    /// Pull a dragged piece flush against a grid neighbor when close enough.
    #[serde(default = "default_neighbor_snap")]
    pub neighbor_snap: bool,
}

impl AlignmentRules {
    pub fn highlight_tolerance_px(&self) -> f32 {
        self.snap_tolerance_px * self.pre_snap_multiplier
    }
}

impl Default for AlignmentRules {
    fn default() -> Self {
        Self {
            snap_tolerance_px: SNAP_TOLERANCE_PX,
            detection_tolerance_px: DETECTION_TOLERANCE_PX,
            pre_snap_multiplier: PRE_SNAP_MULTIPLIER,
            exact_tolerance_px: EXACT_SNAP_TOLERANCE_PX,
            shuffle_margin_px: SHUFFLE_MARGIN_PX,
            neighbor_snap: true,
        }
    }
}

fn default_snap_tolerance() -> f32 {
    SNAP_TOLERANCE_PX
}

fn default_detection_tolerance() -> f32 {
    DETECTION_TOLERANCE_PX
}

fn default_pre_snap_multiplier() -> f32 {
    PRE_SNAP_MULTIPLIER
}

fn default_exact_tolerance() -> f32 {
    EXACT_SNAP_TOLERANCE_PX
}

fn default_shuffle_margin() -> f32 {
    SHUFFLE_MARGIN_PX
}

fn default_neighbor_snap() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_radius_is_twice_snap() {
        let rules = AlignmentRules::default();
        assert_eq!(rules.highlight_tolerance_px(), 36.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let rules: AlignmentRules =
            serde_json::from_str(r#"{"detection_tolerance_px": 4.0}"#).expect("rules");
        assert_eq!(rules.detection_tolerance_px, 4.0);
        assert_eq!(rules.snap_tolerance_px, SNAP_TOLERANCE_PX);
        assert!(rules.neighbor_snap);
    }
}

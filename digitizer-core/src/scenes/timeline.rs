//! Proportional layout of a scene list on a timeline bar.

use digitizer_model::Scene;

/// Segments narrower than this (percent of the total) carry no label.
pub const LABEL_MIN_WIDTH_PCT: f64 = 6.0;

/// Horizontal placement of one scene on a timeline bar, in percent of the
/// total duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineSegment {
    /// 0-based position in the scene list.
    pub position: usize,
    /// The scene's own `scene_index`.
    pub scene_index: u32,
    /// Left edge.
    pub offset_pct: f64,
    /// Width.
    pub width_pct: f64,
}

impl TimelineSegment {
    /// Whether the segment is wide enough to carry its number.
    pub fn shows_label(&self) -> bool {
        self.width_pct > LABEL_MIN_WIDTH_PCT
    }

    /// Percent offset of the cut marker drawn at this segment's left edge;
    /// the first segment has none.
    pub fn cut_marker_pct(&self) -> Option<f64> {
        (self.position > 0).then_some(self.offset_pct)
    }
}

/// Lay `scenes` out over `total_duration` seconds.
///
/// Returns nothing when there is no duration to scale against.
pub fn layout(scenes: &[Scene], total_duration: f64) -> Vec<TimelineSegment> {
    if !(total_duration.is_finite() && total_duration > 0.0) {
        return Vec::new();
    }
    scenes
        .iter()
        .enumerate()
        .map(|(position, scene)| TimelineSegment {
            position,
            scene_index: scene.scene_index,
            offset_pct: scene.start_time / total_duration * 100.0,
            width_pct: (scene.end_time - scene.start_time) / total_duration
                * 100.0,
        })
        .collect()
}

/// Position of the scene covering `t`. The end of the last scene belongs to
/// it so the full span can be addressed.
pub fn scene_at(scenes: &[Scene], t: f64) -> Option<usize> {
    let last = scenes.len().checked_sub(1)?;
    scenes
        .iter()
        .position(|scene| scene.start_time <= t && t < scene.end_time)
        .or_else(|| (t == scenes[last].end_time).then_some(last))
}

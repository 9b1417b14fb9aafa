//! Proposed edits to a job's scene list.

use digitizer_model::{Scene, SceneBoundary};

use tracing::debug;

/// Boundaries closer than this are treated as touching.
pub const BOUNDARY_TOLERANCE: f64 = 1e-6;

/// How [`SceneEditor::adjust_boundary`] treats the neighbours of the scene
/// being adjusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Neighbours' shared edges follow the adjusted scene. The outer span of
    /// the list never moves and no neighbour may collapse.
    #[default]
    Reconcile,
    /// Reject anything that would leave a gap or an overlap.
    Strict,
}

/// First invariant a scene list breaks.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PartitionViolation {
    /// No scenes at all.
    #[error("scene list is empty")]
    Empty,
    /// `scene_index` does not follow list order.
    #[error(
        "scene at position {position} has index {found}, expected {}",
        .position + 1
    )]
    IndexMismatch {
        /// 0-based list position.
        position: usize,
        /// Index the scene carries.
        found: u32,
    },
    /// `start_time >= end_time`.
    #[error("scene at position {position} is empty or inverted")]
    EmptyInterval {
        /// 0-based list position.
        position: usize,
    },
    /// Coverage does not begin at 0.
    #[error("first scene starts at {start}s instead of 0")]
    StartNotZero {
        /// Start of the first scene, seconds.
        start: f64,
    },
    /// Gap or overlap between two neighbours.
    #[error(
        "scene at position {position} ends at {end}s but the next starts at {next_start}s"
    )]
    NotContiguous {
        /// 0-based position of the earlier scene.
        position: usize,
        /// Its end, seconds.
        end: f64,
        /// Start of the scene after it, seconds.
        next_start: f64,
    },
    /// Coverage does not end at the job duration.
    #[error("last scene ends at {end}s, expected {expected}s")]
    EndMismatch {
        /// End of the last scene, seconds.
        end: f64,
        /// Job duration, seconds.
        expected: f64,
    },
}

/// A scene edit that was refused before anything was sent to the server.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneEditError {
    /// Delete on a single-scene list.
    #[error("cannot remove the only remaining scene")]
    LastScene,
    /// Position past the end of the list.
    #[error("scene position {index} is out of range ({len} scenes)")]
    IndexOutOfRange {
        /// Requested 0-based position.
        index: usize,
        /// Number of scenes.
        len: usize,
    },
    /// NaN or infinite time.
    #[error("time value {0} is not finite")]
    NotFinite(f64),
    /// Cut time on a boundary or outside the list.
    #[error("no scene strictly contains {0}s")]
    NoSceneContains(f64),
    /// `start >= end`.
    #[error("start {start}s must be before end {end}s")]
    InvalidBounds {
        /// Requested start, seconds.
        start: f64,
        /// Requested end, seconds.
        end: f64,
    },
    /// Strict policy: the new bounds do not meet the neighbours.
    #[error("adjusting scene at position {index} would leave a gap or overlap")]
    BreaksContiguity {
        /// 0-based position of the adjusted scene.
        index: usize,
    },
    /// Reconcile policy: a neighbour would end up empty or inverted.
    #[error(
        "adjustment would collapse the neighbouring scene at position {index}"
    )]
    NeighborCollapsed {
        /// 0-based position of the neighbour.
        index: usize,
    },
    /// Reconcile policy: the first start or last end would move.
    #[error("adjustment would move the outer edge of the scene list")]
    OuterBoundChanged,
    /// The input list is not a partition to begin with.
    #[error("invalid scene list: {0}")]
    Partition(#[from] PartitionViolation),
}

/// Result of a scene edit.
pub type Result<T> = std::result::Result<T, SceneEditError>;

/// Proposes edited scene lists.
///
/// Every operation borrows the current list and returns a new, re-indexed
/// candidate; the input is never modified. Positions are 0-based list
/// positions, not `scene_index` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneEditor {
    policy: BoundaryPolicy,
}

impl SceneEditor {
    /// Editor applying `policy` to boundary adjustments.
    pub fn new(policy: BoundaryPolicy) -> Self {
        Self { policy }
    }

    /// Policy used by [`adjust_boundary`](Self::adjust_boundary).
    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    /// Merge the scene at `index` into its neighbour.
    ///
    /// The predecessor absorbs the removed interval; when the first scene is
    /// removed the new first scene is extended back to cover it instead.
    pub fn delete(&self, scenes: &[Scene], index: usize) -> Result<Vec<Scene>> {
        check_index(scenes, index)?;
        if scenes.len() == 1 {
            return Err(SceneEditError::LastScene);
        }

        let mut next = scenes.to_vec();
        let removed = next.remove(index);
        if index > 0 {
            let prev = &mut next[index - 1];
            prev.set_bounds(prev.start_time, removed.end_time);
        } else {
            let first = &mut next[0];
            first.set_bounds(removed.start_time, first.end_time);
        }

        reindex(&mut next);
        debug!(
            position = index,
            remaining = next.len(),
            "proposed scene merge"
        );
        Ok(next)
    }

    /// Split the scene strictly containing `t` into `[start, t)` and
    /// `[t, end)`.
    ///
    /// The second half is new: it has no server id, thumbnail or split file.
    pub fn add_cut(&self, scenes: &[Scene], t: f64) -> Result<Vec<Scene>> {
        if !t.is_finite() {
            return Err(SceneEditError::NotFinite(t));
        }
        let position = scenes
            .iter()
            .position(|scene| scene.strictly_contains(t))
            .ok_or(SceneEditError::NoSceneContains(t))?;

        let mut next = scenes.to_vec();
        let original_end = next[position].end_time;
        let job_id = next[position].job_id.clone();
        let head = &mut next[position];
        head.set_bounds(head.start_time, t);

        let tail = Scene::new(job_id, 0, t, original_end);
        next.insert(position + 1, tail);

        reindex(&mut next);
        debug!(position, cut = t, "proposed scene cut");
        Ok(next)
    }

    /// Move the bounds of the scene at `index` using this editor's policy.
    pub fn adjust_boundary(
        &self,
        scenes: &[Scene],
        index: usize,
        new_start: f64,
        new_end: f64,
    ) -> Result<Vec<Scene>> {
        check_index(scenes, index)?;
        for value in [new_start, new_end] {
            if !value.is_finite() {
                return Err(SceneEditError::NotFinite(value));
            }
        }
        if new_start >= new_end {
            return Err(SceneEditError::InvalidBounds {
                start: new_start,
                end: new_end,
            });
        }

        let mut next = scenes.to_vec();
        match self.policy {
            BoundaryPolicy::Reconcile => {
                reconcile_neighbors(&mut next, index, new_start, new_end)?
            }
            BoundaryPolicy::Strict => {
                check_strict(&next, index, new_start, new_end)?
            }
        }
        next[index].set_bounds(new_start, new_end);

        reindex(&mut next);
        debug!(
            position = index,
            start = new_start,
            end = new_end,
            policy = ?self.policy,
            "proposed boundary adjustment"
        );
        Ok(next)
    }
}

fn check_index(scenes: &[Scene], index: usize) -> Result<()> {
    if index >= scenes.len() {
        return Err(SceneEditError::IndexOutOfRange {
            index,
            len: scenes.len(),
        });
    }
    Ok(())
}

fn touches(a: f64, b: f64) -> bool {
    (a - b).abs() <= BOUNDARY_TOLERANCE
}

fn reconcile_neighbors(
    scenes: &mut [Scene],
    index: usize,
    new_start: f64,
    new_end: f64,
) -> Result<()> {
    let last = scenes.len() - 1;

    if index == 0 && !touches(scenes[0].start_time, new_start) {
        return Err(SceneEditError::OuterBoundChanged);
    }
    if index == last && !touches(scenes[last].end_time, new_end) {
        return Err(SceneEditError::OuterBoundChanged);
    }

    if index > 0 {
        let prev = &scenes[index - 1];
        if new_start <= prev.start_time + BOUNDARY_TOLERANCE {
            return Err(SceneEditError::NeighborCollapsed { index: index - 1 });
        }
    }
    if index < last {
        let succ = &scenes[index + 1];
        if new_end >= succ.end_time - BOUNDARY_TOLERANCE {
            return Err(SceneEditError::NeighborCollapsed { index: index + 1 });
        }
    }

    if index > 0 {
        let prev = &mut scenes[index - 1];
        prev.set_bounds(prev.start_time, new_start);
    }
    if index < last {
        let succ = &mut scenes[index + 1];
        succ.set_bounds(new_end, succ.end_time);
    }
    Ok(())
}

fn check_strict(
    scenes: &[Scene],
    index: usize,
    new_start: f64,
    new_end: f64,
) -> Result<()> {
    let expected_start = match index {
        0 => scenes[0].start_time,
        _ => scenes[index - 1].end_time,
    };
    let expected_end = scenes
        .get(index + 1)
        .map_or(scenes[index].end_time, |succ| succ.start_time);

    if touches(expected_start, new_start) && touches(expected_end, new_end) {
        Ok(())
    } else {
        Err(SceneEditError::BreaksContiguity { index })
    }
}

/// Renumber `scene_index` to `1..=N` in list order.
pub fn reindex(scenes: &mut [Scene]) {
    for (position, scene) in scenes.iter_mut().enumerate() {
        scene.scene_index = position as u32 + 1;
    }
}

/// Rows for a whole-list replace.
pub fn to_boundaries(scenes: &[Scene]) -> Vec<SceneBoundary> {
    scenes.iter().map(Scene::boundary).collect()
}

/// Check that `scenes` partitions `[0, total_duration]`.
pub fn validate_partition(
    scenes: &[Scene],
    total_duration: f64,
) -> std::result::Result<(), PartitionViolation> {
    let Some(first) = scenes.first() else {
        return Err(PartitionViolation::Empty);
    };
    if !touches(first.start_time, 0.0) {
        return Err(PartitionViolation::StartNotZero {
            start: first.start_time,
        });
    }

    for (position, scene) in scenes.iter().enumerate() {
        if scene.scene_index as usize != position + 1 {
            return Err(PartitionViolation::IndexMismatch {
                position,
                found: scene.scene_index,
            });
        }
        if scene.start_time >= scene.end_time {
            return Err(PartitionViolation::EmptyInterval { position });
        }
        if let Some(succ) = scenes.get(position + 1)
            && !touches(scene.end_time, succ.start_time)
        {
            return Err(PartitionViolation::NotContiguous {
                position,
                end: scene.end_time,
                next_start: succ.start_time,
            });
        }
    }

    let end = scenes[scenes.len() - 1].end_time;
    if !touches(end, total_duration) {
        return Err(PartitionViolation::EndMismatch {
            end,
            expected: total_duration,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use digitizer_model::JobId;

    fn scenes(bounds: &[(f64, f64)]) -> Vec<Scene> {
        bounds
            .iter()
            .enumerate()
            .map(|(i, (start, end))| {
                Scene::new(JobId::new("job"), i as u32 + 1, *start, *end)
                    .with_id(format!("s{}", i + 1))
            })
            .collect()
    }

    fn bounds(scenes: &[Scene]) -> Vec<(u32, f64, f64)> {
        scenes
            .iter()
            .map(|s| (s.scene_index, s.start_time, s.end_time))
            .collect()
    }

    #[test]
    fn reindex_numbers_in_list_order() {
        let mut list = scenes(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        list[0].scene_index = 7;
        list[2].scene_index = 7;
        reindex(&mut list);
        assert_eq!(
            list.iter().map(|s| s.scene_index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn delete_extends_predecessor() {
        let list = scenes(&[(0.0, 30.0), (30.0, 70.0), (70.0, 100.0)]);
        let next = SceneEditor::default().delete(&list, 1).expect("delete");
        assert_eq!(bounds(&next), vec![(1, 0.0, 70.0), (2, 70.0, 100.0)]);
        assert_eq!(next[0].duration, 70.0);
        assert_eq!(next[0].id.as_deref(), Some("s1"));
        validate_partition(&next, 100.0).expect("still a partition");
    }

    #[test]
    fn delete_first_pulls_successor_back() {
        let list = scenes(&[(0.0, 30.0), (30.0, 100.0)]);
        let next = SceneEditor::default().delete(&list, 0).expect("delete");
        assert_eq!(bounds(&next), vec![(1, 0.0, 100.0)]);
        assert_eq!(next[0].id.as_deref(), Some("s2"));
    }

    #[test]
    fn delete_last_scene_extends_predecessor() {
        let list = scenes(&[(0.0, 30.0), (30.0, 100.0)]);
        let next = SceneEditor::default().delete(&list, 1).expect("delete");
        assert_eq!(bounds(&next), vec![(1, 0.0, 100.0)]);
    }

    #[test]
    fn delete_rejects_single_scene_and_bad_index() {
        let editor = SceneEditor::default();
        let single = scenes(&[(0.0, 10.0)]);
        assert_eq!(editor.delete(&single, 0), Err(SceneEditError::LastScene));
        assert_eq!(
            editor.delete(&single, 3),
            Err(SceneEditError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert_eq!(
            editor.delete(&[], 0),
            Err(SceneEditError::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn add_cut_splits_containing_scene() {
        let mut list = scenes(&[(0.0, 50.0), (50.0, 100.0)]);
        list[1].thumbnail_path = Some("/thumbs/job/scene_002.jpg".into());
        let next = SceneEditor::default().add_cut(&list, 75.0).expect("cut");

        assert_eq!(
            bounds(&next),
            vec![(1, 0.0, 50.0), (2, 50.0, 75.0), (3, 75.0, 100.0)]
        );
        assert_eq!(next[1].id.as_deref(), Some("s2"));
        assert!(next[1].thumbnail_path.is_some());
        assert!(next[2].id.is_none());
        assert!(next[2].thumbnail_path.is_none());
        assert!(next[2].split_path.is_none());
        assert_eq!(next[2].duration, 25.0);
    }

    #[test]
    fn add_cut_rejects_boundaries_and_outside_points() {
        let editor = SceneEditor::default();
        let list = scenes(&[(0.0, 50.0), (50.0, 100.0)]);
        for t in [0.0, 50.0, 100.0, -1.0, 150.0] {
            assert_eq!(
                editor.add_cut(&list, t),
                Err(SceneEditError::NoSceneContains(t))
            );
        }
        assert!(matches!(
            editor.add_cut(&list, f64::NAN),
            Err(SceneEditError::NotFinite(_))
        ));
    }

    #[test]
    fn adjust_reconciles_neighbours() {
        let list = scenes(&[(0.0, 30.0), (30.0, 70.0), (70.0, 100.0)]);
        let next = SceneEditor::default()
            .adjust_boundary(&list, 1, 25.0, 80.0)
            .expect("adjust");
        assert_eq!(
            bounds(&next),
            vec![(1, 0.0, 25.0), (2, 25.0, 80.0), (3, 80.0, 100.0)]
        );
        assert_eq!(next[2].duration, 20.0);
        validate_partition(&next, 100.0).expect("still a partition");
    }

    #[test]
    fn adjust_rejects_collapsing_a_neighbour() {
        let editor = SceneEditor::default();
        let list = scenes(&[(0.0, 30.0), (30.0, 70.0), (70.0, 100.0)]);
        assert_eq!(
            editor.adjust_boundary(&list, 1, 0.0, 70.0),
            Err(SceneEditError::NeighborCollapsed { index: 0 })
        );
        assert_eq!(
            editor.adjust_boundary(&list, 1, 30.0, 120.0),
            Err(SceneEditError::NeighborCollapsed { index: 2 })
        );
    }

    #[test]
    fn adjust_keeps_outer_span_fixed() {
        let editor = SceneEditor::default();
        let list = scenes(&[(0.0, 30.0), (30.0, 100.0)]);
        assert_eq!(
            editor.adjust_boundary(&list, 0, 5.0, 30.0),
            Err(SceneEditError::OuterBoundChanged)
        );
        assert_eq!(
            editor.adjust_boundary(&list, 1, 30.0, 90.0),
            Err(SceneEditError::OuterBoundChanged)
        );
        let moved = editor
            .adjust_boundary(&list, 0, 0.0, 40.0)
            .expect("inner edge may move");
        assert_eq!(bounds(&moved), vec![(1, 0.0, 40.0), (2, 40.0, 100.0)]);
    }

    #[test]
    fn adjust_validates_inputs() {
        let editor = SceneEditor::default();
        let list = scenes(&[(0.0, 30.0), (30.0, 100.0)]);
        assert_eq!(
            editor.adjust_boundary(&list, 0, 20.0, 20.0),
            Err(SceneEditError::InvalidBounds {
                start: 20.0,
                end: 20.0
            })
        );
        assert!(matches!(
            editor.adjust_boundary(&list, 0, 0.0, f64::INFINITY),
            Err(SceneEditError::NotFinite(_))
        ));
        assert_eq!(
            editor.adjust_boundary(&list, 2, 0.0, 1.0),
            Err(SceneEditError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn strict_policy_rejects_gaps_and_overlaps() {
        let editor = SceneEditor::new(BoundaryPolicy::Strict);
        let list = scenes(&[(0.0, 30.0), (30.0, 70.0), (70.0, 100.0)]);
        assert_eq!(
            editor.adjust_boundary(&list, 1, 35.0, 70.0),
            Err(SceneEditError::BreaksContiguity { index: 1 })
        );
        assert_eq!(
            editor.adjust_boundary(&list, 1, 30.0, 75.0),
            Err(SceneEditError::BreaksContiguity { index: 1 })
        );
        let next = editor
            .adjust_boundary(&list, 1, 30.0 + 1e-9, 70.0)
            .expect("within tolerance");
        assert_eq!(next.len(), 3);
    }

    #[test]
    fn validate_partition_reports_first_violation() {
        let good = scenes(&[(0.0, 10.0), (10.0, 20.0)]);
        assert_eq!(validate_partition(&good, 20.0), Ok(()));
        assert_eq!(validate_partition(&[], 20.0), Err(PartitionViolation::Empty));
        assert_eq!(
            validate_partition(&scenes(&[(1.0, 10.0)]), 10.0),
            Err(PartitionViolation::StartNotZero { start: 1.0 })
        );
        assert_eq!(
            validate_partition(&scenes(&[(0.0, 10.0), (12.0, 20.0)]), 20.0),
            Err(PartitionViolation::NotContiguous {
                position: 0,
                end: 10.0,
                next_start: 12.0
            })
        );
        assert_eq!(
            validate_partition(&good, 25.0),
            Err(PartitionViolation::EndMismatch {
                end: 20.0,
                expected: 25.0
            })
        );

        let mut misnumbered = good.clone();
        misnumbered[1].scene_index = 5;
        assert_eq!(
            validate_partition(&misnumbered, 20.0),
            Err(PartitionViolation::IndexMismatch {
                position: 1,
                found: 5
            })
        );
    }

    #[test]
    fn boundaries_mirror_scene_bounds() {
        let list = scenes(&[(0.0, 10.0), (10.0, 20.0)]);
        let rows = to_boundaries(&list);
        assert_eq!(rows[1].scene_index, 2);
        assert_eq!(rows[1].start_time, 10.0);
        assert_eq!(rows[1].end_time, 20.0);
    }
}

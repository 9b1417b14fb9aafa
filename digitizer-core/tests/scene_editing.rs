//! Multi-step scene editing sessions against a single job's partition.

use digitizer_core::scenes::{
    BoundaryPolicy, SceneEditError, SceneEditor, layout, to_boundaries,
    validate_partition,
};
use digitizer_model::{JobId, Scene};

fn partition(bounds: &[(f64, f64)]) -> Vec<Scene> {
    bounds
        .iter()
        .enumerate()
        .map(|(i, (start, end))| {
            Scene::new(JobId::new("tape-7"), i as u32 + 1, *start, *end)
                .with_id(format!("scene-{}", i + 1))
        })
        .collect()
}

fn rows(scenes: &[Scene]) -> Vec<(u32, f64, f64)> {
    scenes
        .iter()
        .map(|s| (s.scene_index, s.start_time, s.end_time))
        .collect()
}

#[test]
fn cut_then_merge_restores_single_scene() {
    let editor = SceneEditor::default();
    let scenes = partition(&[(0.0, 120.0)]);

    let cut = editor.add_cut(&scenes, 45.5).expect("cut inside scene");
    assert_eq!(rows(&cut), vec![(1, 0.0, 45.5), (2, 45.5, 120.0)]);
    validate_partition(&cut, 120.0).expect("cut keeps partition");

    let merged = editor.delete(&cut, 0).expect("merge first scene");
    assert_eq!(rows(&merged), vec![(1, 0.0, 120.0)]);
    assert_eq!(merged[0].duration, 120.0);
    validate_partition(&merged, 120.0).expect("merge keeps partition");

    assert_eq!(editor.delete(&merged, 0), Err(SceneEditError::LastScene));
}

#[test]
fn deleting_middle_scene_extends_predecessor() {
    let editor = SceneEditor::default();
    let scenes = partition(&[(0.0, 30.0), (30.0, 70.0), (70.0, 100.0)]);

    let merged = editor.delete(&scenes, 1).expect("merge middle scene");

    assert_eq!(rows(&merged), vec![(1, 0.0, 70.0), (2, 70.0, 100.0)]);
    let payload = to_boundaries(&merged);
    assert_eq!(payload.len(), 2);
    assert_eq!(payload[1].scene_index, 2);
}

#[test]
fn every_delete_keeps_full_coverage() {
    let editor = SceneEditor::default();
    let bounds = [(0.0, 12.0), (12.0, 40.0), (40.0, 41.5), (41.5, 90.0)];
    for index in 0..bounds.len() {
        let scenes = partition(&bounds);
        let next = editor.delete(&scenes, index).expect("delete");
        assert_eq!(next.len(), bounds.len() - 1);
        validate_partition(&next, 90.0).expect("coverage after delete");
    }
}

#[test]
fn mixed_edit_session_stays_contiguous() {
    let editor = SceneEditor::new(BoundaryPolicy::Reconcile);
    let mut scenes = partition(&[(0.0, 600.0)]);

    for t in [120.0, 300.0, 450.0] {
        scenes = editor.add_cut(&scenes, t).expect("cut");
    }
    scenes = editor
        .adjust_boundary(&scenes, 1, 110.0, 320.0)
        .expect("adjust middle scene");
    scenes = editor.delete(&scenes, 2).expect("merge");

    assert_eq!(
        rows(&scenes),
        vec![(1, 0.0, 110.0), (2, 110.0, 450.0), (3, 450.0, 600.0)]
    );
    validate_partition(&scenes, 600.0).expect("partition after session");

    let segments = layout(&scenes, 600.0);
    let total: f64 = segments.iter().map(|s| s.width_pct).sum();
    assert!((total - 100.0).abs() < 1e-9);
}

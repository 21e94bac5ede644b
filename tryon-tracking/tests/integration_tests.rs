//! Integration tests for tryon-tracking
//!
//! These drive the detection loop against a real session: catalog, model
//! file and landmark recording are written to a temporary directory.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tryon_core::{Error, Face, KeyPointIndices, NodeKind, Point3f, Vector3f, FACE_MESH_LANDMARKS};
use tryon_io::{AssetCatalog, FaceRecord, FrameRecord, LandmarkRecord, TryOnConfig};
use tryon_tracking::*;

const TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [ { "nodes": [0] } ],
  "nodes": [ { "mesh": 0 } ],
  "meshes": [ { "name": "frame", "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1 } ] } ],
  "buffers": [ { "byteLength": 44,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA=" } ],
  "bufferViews": [ { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
                   { "buffer": 0, "byteOffset": 36, "byteLength": 6 } ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" } ]
}"#;

/// Temporary directory removed on drop
struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir()
            .join(format!("tryon-tracking-{name}-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("glasses")).unwrap();
        std::fs::write(dir.join("glasses/scene.gltf"), TRIANGLE_GLTF).unwrap();
        let catalog = r#"{ "assets": [
            { "id": "round", "model-path": "glasses", "model": "scene.gltf", "type": "gltf",
              "y": 0.5, "scale": 0.5, "up": 10 },
            { "id": "broken", "model-path": "glasses", "model": "missing.glb", "type": "glb" }
        ] }"#;
        std::fs::write(dir.join("catalog.json"), catalog).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn catalog(&self) -> AssetCatalog {
        AssetCatalog::read(self.path("catalog.json")).unwrap()
    }

    fn write_record(&self, frames: &[Vec<Face>]) -> PathBuf {
        let record = LandmarkRecord {
            frames: frames
                .iter()
                .map(|faces| FrameRecord {
                    faces: faces.iter().map(FaceRecord::from).collect(),
                })
                .collect(),
        };
        let path = self.path("landmarks.json");
        record.write(&path).unwrap();
        path
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.dir).ok();
    }
}

fn face_at(x: f32, y: f32) -> Face {
    let indices = KeyPointIndices::default();
    let mut mesh = vec![Point3f::new(x, y, 0.0); FACE_MESH_LANDMARKS];
    mesh[indices.left_eye] = Point3f::new(x - 20.0, y, 0.0);
    mesh[indices.right_eye] = Point3f::new(x + 20.0, y, 0.0);
    mesh[indices.nose_bottom] = Point3f::new(x, y + 50.0, 0.0);
    Face::new(mesh)
}

async fn live_session(workspace: &Workspace) -> TryOnSession {
    let mut session = TryOnSession::new(&TryOnConfig::default(), workspace.catalog()).unwrap();
    assert!(session.load_selected().await);
    session.set_mode(SourceMode::Live, (640, 480));
    session
}

#[tokio::test]
async fn test_one_to_two_faces_leaves_two_instances() {
    let workspace = Workspace::new("transition");
    let record = workspace.write_record(&[
        vec![face_at(100.0, 100.0)],
        vec![face_at(100.0, 100.0), face_at(400.0, 120.0)],
    ]);
    let mut session = live_session(&workspace).await;
    let mut source = BlankFrames::new(640, 480);
    let mut detection = DetectionLoop::new();
    detection.enable(&ReplayLoader::new(record)).await.unwrap();

    let outcome = detection.run_cycle(&mut source, &mut session).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Applied { faces: 1 });
    let first = session.instances().overlay_nodes();
    assert_eq!(first.len(), 1);

    let outcome = detection.run_cycle(&mut source, &mut session).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Applied { faces: 2 });
    let second = session.instances().overlay_nodes();
    assert_eq!(second.len(), 2);
    assert!(!session.scene().contains(first[0]));
    for id in &second {
        let node = session.scene().get(*id).unwrap();
        assert!(matches!(node.kind, NodeKind::Model { .. }));
    }
    // Two overlays and two hidden face meshes
    assert_eq!(session.scene().len(), 4);
    assert_eq!(session.scene().visible().count(), 2);
    assert!(session.frame().is_some());
}

#[tokio::test]
async fn test_live_placement_uses_calibration_and_camera_depth() {
    let workspace = Workspace::new("placement");
    let record = workspace.write_record(&[vec![face_at(100.0, 100.0)]]);
    let mut session = live_session(&workspace).await;
    let mut detection = DetectionLoop::new();
    detection.enable(&ReplayLoader::new(record)).await.unwrap();
    detection
        .run_cycle(&mut BlankFrames::new(640, 480), &mut session)
        .await
        .unwrap();

    let depth = session.camera().depth();
    let id = session.instances().overlay_nodes()[0];
    let transform = session.scene().get(id).unwrap().transform;
    assert_eq!(transform.position, Vector3f::new(100.0, -100.0 + 10.0 + 0.5, -depth));
    assert!((transform.scale.x - 20.0).abs() < 1e-4);
    assert_eq!(transform.up, Vector3f::new(0.0, 1.0, 0.0));
}

struct SpyProvider {
    calls: Arc<AtomicUsize>,
    disarm_after: usize,
    handle: LoopHandle,
}

impl LandmarkProvider for SpyProvider {
    async fn estimate_faces(&mut self, _frame: &Frame) -> tryon_core::Result<Vec<Face>> {
        let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if calls == self.disarm_after {
            // Disabled while this inference is in flight
            self.handle.disarm();
        }
        Ok(vec![face_at(100.0, 100.0)])
    }
}

struct SpyLoader {
    calls: Arc<AtomicUsize>,
    disarm_after: usize,
    handle: LoopHandle,
}

impl LandmarkModelLoader for SpyLoader {
    type Provider = SpyProvider;

    async fn load(&self) -> tryon_core::Result<SpyProvider> {
        Ok(SpyProvider {
            calls: self.calls.clone(),
            disarm_after: self.disarm_after,
            handle: self.handle.clone(),
        })
    }
}

#[tokio::test]
async fn test_disabling_stops_cycles_and_clears_instances() {
    let workspace = Workspace::new("disable");
    let mut session = live_session(&workspace).await;
    let mut source = BlankFrames::new(640, 480);
    let mut detection = DetectionLoop::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let loader = SpyLoader {
        calls: calls.clone(),
        disarm_after: 3,
        handle: detection.handle(),
    };
    detection.enable(&loader).await.unwrap();

    let attempted = detection
        .run(&mut source, &mut session, 1000.0, Some(100))
        .await
        .unwrap();
    assert_eq!(attempted, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // The third result arrived after disarming and was dropped
    assert_eq!(detection.cycles(), 2);
    assert_eq!(detection.state(), &LoopState::Idle);
    assert!(session.instances().is_empty());

    detection.disable(&mut session);
    assert_eq!(detection.state(), &LoopState::Idle);
    assert!(session.instances().is_empty());
    assert!(session.scene().is_empty());

    let outcome = detection.run_cycle(&mut source, &mut session).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Stopped);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

/// Cancels through the loop handle while the model is loading
struct CancelledLoader {
    handle: LoopHandle,
}

impl LandmarkModelLoader for CancelledLoader {
    type Provider = ReplayProvider;

    async fn load(&self) -> tryon_core::Result<ReplayProvider> {
        self.handle.disarm();
        Ok(ReplayProvider::new(vec![vec![face_at(100.0, 100.0)]]))
    }
}

#[tokio::test]
async fn test_disarm_during_loading_is_honoured() {
    let workspace = Workspace::new("cancel-loading");
    let mut session = live_session(&workspace).await;
    let mut source = BlankFrames::new(640, 480);
    let mut detection = DetectionLoop::new();
    let loader = CancelledLoader {
        handle: detection.handle(),
    };

    detection.enable(&loader).await.unwrap();
    assert_eq!(detection.state(), &LoopState::Idle);
    assert!(!detection.handle().is_armed());
    assert!(!detection.is_running());

    let outcome = detection.run_cycle(&mut source, &mut session).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Stopped);
    assert_eq!(detection.cycles(), 0);
    assert!(session.instances().is_empty());

    // A later enable is not affected by the cancelled one
    let fresh = CancelledLoader {
        handle: LoopHandle::default(),
    };
    detection.enable(&fresh).await.unwrap();
    assert_eq!(detection.state(), &LoopState::Active);
}

#[tokio::test]
async fn test_handle_disarm_while_active_returns_to_idle() {
    let workspace = Workspace::new("cancel-active");
    let mut session = live_session(&workspace).await;
    let mut source = BlankFrames::new(640, 480);
    let mut detection = DetectionLoop::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let loader = SpyLoader {
        calls: calls.clone(),
        disarm_after: 0,
        handle: detection.handle(),
    };
    detection.enable(&loader).await.unwrap();
    detection.run_cycle(&mut source, &mut session).await.unwrap();
    assert_eq!(session.instances().len(), 1);

    detection.handle().disarm();
    let outcome = detection.run_cycle(&mut source, &mut session).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Stopped);
    assert_eq!(detection.state(), &LoopState::Idle);
    assert!(session.instances().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

struct FailingProvider;

impl LandmarkProvider for FailingProvider {
    async fn estimate_faces(&mut self, _frame: &Frame) -> tryon_core::Result<Vec<Face>> {
        Err(Error::Inference("backend lost".into()))
    }
}

/// Fails the first `failures` loads
struct FlakyLoader {
    attempts: AtomicUsize,
    failures: usize,
}

impl LandmarkModelLoader for FlakyLoader {
    type Provider = FailingProvider;

    async fn load(&self) -> tryon_core::Result<FailingProvider> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(Error::ModelLoad("weights unavailable".into()));
        }
        Ok(FailingProvider)
    }
}

#[tokio::test]
async fn test_model_load_failure_and_manual_retry() {
    let mut detection = DetectionLoop::new();
    let loader = FlakyLoader {
        attempts: AtomicUsize::new(0),
        failures: 1,
    };

    let err = detection.enable(&loader).await.unwrap_err();
    assert!(matches!(err, Error::ModelLoad(_)));
    assert!(matches!(
        detection.state(),
        LoopState::Error(msg) if msg.contains("weights unavailable")
    ));
    assert!(!detection.handle().is_armed());

    detection.enable(&loader).await.unwrap();
    assert_eq!(detection.state(), &LoopState::Active);
}

#[tokio::test]
async fn test_inference_failure_disarms_loop() {
    let workspace = Workspace::new("inference");
    let mut session = live_session(&workspace).await;
    let mut detection = DetectionLoop::new();
    let loader = FlakyLoader {
        attempts: AtomicUsize::new(0),
        failures: 0,
    };
    detection.enable(&loader).await.unwrap();

    let err = detection
        .run_cycle(&mut BlankFrames::new(640, 480), &mut session)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Inference(_)));
    assert!(matches!(detection.state(), LoopState::Error(_)));
    assert!(!detection.is_running());
}

#[tokio::test]
async fn test_still_mode_places_selected_glasses_once() {
    let workspace = Workspace::new("still");
    let mut session = TryOnSession::new(&TryOnConfig::default(), workspace.catalog()).unwrap();
    assert!(session.load_selected().await);
    session.refresh_still();

    assert_eq!(session.instances().len(), 1);
    let id = session.instances().overlay_nodes()[0];
    let transform = session.scene().get(id).unwrap().transform;
    assert_eq!(transform.position, Vector3f::new(0.0, 0.5, 0.0));
    assert_eq!(transform.scale, Vector3f::new(0.5, 0.5, 0.5));

    // A broken asset leaves the still view empty
    assert!(!session.select_relative(1).await);
    assert_eq!(session.selected_index(), 1);
    assert!(session.instances().is_empty());

    // Wrapping back reloads the working asset
    assert!(session.select_relative(1).await);
    assert_eq!(session.selected_index(), 0);
    assert_eq!(session.instances().len(), 1);
}

#[tokio::test]
async fn test_failed_asset_still_tracks_faces_with_groups() {
    let workspace = Workspace::new("groups");
    let mut session = live_session(&workspace).await;
    assert!(!session.select(1).await);

    let frame = BlankFrames::new(640, 480).next_frame().unwrap();
    session.apply_faces(&frame, &[face_at(50.0, 50.0), face_at(300.0, 60.0)]);
    assert_eq!(session.instances().len(), 2);
    for id in session.instances().overlay_nodes() {
        assert!(matches!(session.scene().get(id).unwrap().kind, NodeKind::Group));
    }
}

#[test]
fn test_face_mesh_toggle_and_notice() {
    let workspace = Workspace::new("toggle");
    let mut session = TryOnSession::new(&TryOnConfig::default(), workspace.catalog()).unwrap();
    assert!(!session.show_face_mesh());
    assert!(session.toggle_face_mesh());

    session.set_notice("Fail to load face mesh model");
    assert_eq!(session.notice(), Some("Fail to load face mesh model"));
    assert!(session.dismiss_notice());
    assert!(!session.dismiss_notice());
}

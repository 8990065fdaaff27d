use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::event_queue::EventQueue;
use crate::input::{InputDevices, NavSample, PointerSample};
use crate::render::{draw_snapshot, DrawCall, RecordingSurface};
use crate::script_host::ScriptHost;
use crate::tree::SceneTree;

/// Deterministic headless run: a UI script plus scripted input, stepped
/// frame by frame on one thread (render side first, then the script side,
/// exactly one swap per frame). Used by the demo binary and the
/// integration tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarnessFixture {
    pub script: String,
    #[serde(default = "HarnessFixture::default_frames")]
    pub frames: usize,
    #[serde(default = "HarnessFixture::default_frame_ms")]
    pub frame_ms: u64,
    /// Pointer keyframes; the latest keyframe at or before the current
    /// frame is the sample for that frame.
    #[serde(default)]
    pub pointer: Vec<PointerKey>,
    #[serde(default)]
    pub nav: Vec<NavKey>,
}

impl HarnessFixture {
    pub fn for_script(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            frames: Self::default_frames(),
            frame_ms: Self::default_frame_ms(),
            pointer: Vec::new(),
            nav: Vec::new(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Parsing {}", path.display()))
    }

    const fn default_frames() -> usize {
        60
    }

    const fn default_frame_ms() -> u64 {
        16
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointerKey {
    pub frame: usize,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub down: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NavAction {
    Up,
    Down,
    Left,
    Right,
    /// Starts holding the confirm button.
    Confirm,
    /// Releases the confirm button.
    Release,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavKey {
    pub frame: usize,
    pub action: NavAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameResult {
    pub frame: usize,
    /// Events sitting in the queue when the script side took over.
    pub queued_events: usize,
    pub draw_calls: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarnessReport {
    pub frames: usize,
    pub results: Vec<FrameResult>,
    /// Draw calls of the last rendered frame.
    pub final_frame: Vec<DrawCall>,
    pub final_node_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_error: Option<String>,
}

pub fn run_fixture(fixture: &HarnessFixture) -> Result<HarnessReport> {
    let mut tree = SceneTree::new();
    let view = tree.view();
    let queue = EventQueue::default();
    let mut devices = InputDevices::new();
    let mut surface = RecordingSurface::new();

    let mut host = ScriptHost::new(&fixture.script);
    host.force_reload().with_context(|| format!("Loading fixture script {}", fixture.script))?;

    let start = Instant::now();
    let frame_dt = fixture.frame_ms as f32 / 1000.0;
    let mut confirm_held = false;
    let mut results = Vec::with_capacity(fixture.frames);

    for frame in 0..fixture.frames {
        let now = start + Duration::from_millis(fixture.frame_ms * frame as u64);

        // Render/input side: poll devices against the current snapshot and
        // record a frame under one render lock.
        devices.poll_pointer(pointer_sample(&fixture.pointer, frame), &view, &queue);
        let nav = nav_sample(&fixture.nav, frame, &mut confirm_held);
        devices.poll_nav(nav, &view, &queue);

        surface.clear();
        {
            let guard = view.render_lock();
            draw_snapshot(guard.snapshot(), &devices, &mut surface);
        }

        let queued_events = queue.len();

        // Script side: consume input, run timers and update, publish.
        host.pump(&mut tree, &queue, now, frame_dt);
        tree.swap();

        results.push(FrameResult { frame, queued_events, draw_calls: surface.calls.len() });
    }

    let final_node_count = view.render_lock().snapshot().len();
    Ok(HarnessReport {
        frames: fixture.frames,
        results,
        final_frame: surface.calls.clone(),
        final_node_count,
        script_error: host.last_error().map(str::to_owned),
    })
}

fn pointer_sample(keys: &[PointerKey], frame: usize) -> PointerSample {
    let mut sample = PointerSample::default();
    for key in keys {
        if key.frame <= frame {
            sample = PointerSample { x: key.x, y: key.y, down: key.down };
        }
    }
    sample
}

fn nav_sample(keys: &[NavKey], frame: usize, confirm_held: &mut bool) -> NavSample {
    let mut sample = NavSample::default();
    for key in keys {
        if key.frame != frame {
            continue;
        }
        match key.action {
            NavAction::Up => sample.up = true,
            NavAction::Down => sample.down = true,
            NavAction::Left => sample.left = true,
            NavAction::Right => sample.right = true,
            NavAction::Confirm => *confirm_held = true,
            NavAction::Release => *confirm_held = false,
        }
    }
    sample.confirm = *confirm_held;
    sample
}

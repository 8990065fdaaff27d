use anyhow::{Context, Result};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::AppConfig;
use crate::event_queue::EventQueue;
use crate::script_host::ScriptHost;
use crate::time::{TickPacer, Time};
use crate::tree::{SceneTree, SceneView};

/// Explicit runtime context: the back-buffered tree plus the shared event
/// queue. The snapshot pointer inside the tree and the queue are the only
/// state both threads touch; everything else stays thread-local.
pub struct UiRuntime {
    tree: SceneTree,
    queue: Arc<EventQueue>,
}

impl UiRuntime {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            tree: SceneTree::new(),
            queue: Arc::new(EventQueue::new(config.events.capacity)),
        }
    }

    pub fn view(&self) -> SceneView {
        self.tree.view()
    }

    pub fn queue(&self) -> Arc<EventQueue> {
        Arc::clone(&self.queue)
    }

    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    /// The script-thread loop: drain input, fire timers, run `update`, swap
    /// once per iteration, sleep to the configured cadence. Returns when the
    /// queue's shutdown flag is raised.
    pub fn run_script_loop(mut self, mut host: ScriptHost, tick_hz: u32) {
        let mut time = Time::new();
        let mut pacer = TickPacer::from_hz(tick_hz);
        while !self.queue.is_shutdown() {
            time.tick();
            host.pump(&mut self.tree, &self.queue, time.now(), time.delta_seconds());
            self.tree.swap();
            pacer.wait();
        }
    }
}

/// Handle held by the render/input side while the script thread runs.
pub struct RuntimeHandle {
    view: SceneView,
    queue: Arc<EventQueue>,
    script_thread: JoinHandle<()>,
}

impl RuntimeHandle {
    pub fn view(&self) -> &SceneView {
        &self.view
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// Raises the shutdown flag and waits for the script thread to finish
    /// its current iteration and exit.
    pub fn shutdown(self) {
        self.queue.shutdown();
        if self.script_thread.join().is_err() {
            eprintln!("[runtime] script thread panicked during shutdown");
        }
    }
}

/// Spawns the script thread for `config.script.path` and returns the
/// render-side handle. Fails if the script file cannot be read; compile
/// errors are not fatal because the host re-reads the file when it changes.
pub fn start(config: &AppConfig) -> Result<RuntimeHandle> {
    std::fs::metadata(&config.script.path)
        .with_context(|| format!("UI script not found: {}", config.script.path))?;

    let runtime = UiRuntime::new(config);
    let view = runtime.view();
    let queue = runtime.queue();
    let script_path = config.script.path.clone();
    let tick_hz = config.script.tick_hz;

    let script_thread = thread::Builder::new()
        .name("tern-script".into())
        .spawn(move || {
            // The rhai engine is built on the thread that uses it.
            let mut host = ScriptHost::new(&script_path);
            if let Err(err) = host.force_reload() {
                eprintln!("[runtime] initial script load failed: {err:#}");
            }
            runtime.run_script_loop(host, tick_hz);
        })
        .context("Spawning script thread")?;

    Ok(RuntimeHandle { view, queue, script_thread })
}

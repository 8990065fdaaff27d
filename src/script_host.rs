use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use anyhow::{Context, Result};
use rand::Rng;
use rhai::{Engine, EvalAltResult, FuncArgs, Scope, AST};

use crate::color::Color;
use crate::event_queue::EventQueue;
use crate::node::{ButtonProps, NodeKind, RectProps, TextProps};
use crate::timers::{TimerId, TimerScheduler};
use crate::tree::SceneTree;

/// Handle passed into every script entry point. Scripts mutate the back
/// buffer and the timer table through it; the pointers are refreshed for
/// each dispatch and only valid for its duration.
#[derive(Clone, Copy)]
pub struct ScriptApi {
    tree: *mut SceneTree,
    timers: *mut TimerScheduler<String>,
    now: Instant,
}

unsafe impl Send for ScriptApi {}
unsafe impl Sync for ScriptApi {}

impl ScriptApi {
    pub fn new(tree: &mut SceneTree, timers: &mut TimerScheduler<String>, now: Instant) -> Self {
        Self { tree, timers, now }
    }

    fn tree(&mut self) -> &mut SceneTree {
        unsafe { &mut *self.tree }
    }

    fn timers(&mut self) -> &mut TimerScheduler<String> {
        unsafe { &mut *self.timers }
    }

    fn create_rect(&mut self, id: &str, x: rhai::INT, y: rhai::INT, w: rhai::INT, h: rhai::INT) {
        let props = RectProps::at(x as i32, y as i32, w as i32, h as i32);
        self.tree().create_node(id, NodeKind::Rect(props));
    }

    fn rect_bounds(
        &mut self,
        id: &str,
        x: rhai::INT,
        y: rhai::INT,
        w: rhai::INT,
        h: rhai::INT,
    ) -> bool {
        self.tree().set_rect_bounds(id, x as i32, y as i32, w as i32, h as i32)
    }

    fn rect_fill(
        &mut self,
        id: &str,
        r: rhai::INT,
        g: rhai::INT,
        b: rhai::INT,
        a: rhai::INT,
    ) -> bool {
        let color = color_from_ints(r, g, b, a);
        self.tree().set_rect_fill(id, Some(color))
    }

    fn rect_no_fill(&mut self, id: &str) -> bool {
        self.tree().set_rect_fill(id, None)
    }

    fn rect_outline(
        &mut self,
        id: &str,
        r: rhai::INT,
        g: rhai::INT,
        b: rhai::INT,
        a: rhai::INT,
    ) -> bool {
        let color = color_from_ints(r, g, b, a);
        self.tree().set_rect_outline(id, Some(color))
    }

    fn rect_no_outline(&mut self, id: &str) -> bool {
        self.tree().set_rect_outline(id, None)
    }

    fn create_text(&mut self, id: &str, font_size: rhai::INT) {
        let props = TextProps { font_size: font_size as i32, ..TextProps::default() };
        self.tree().create_node(id, NodeKind::Text(props));
    }

    fn text_color(
        &mut self,
        id: &str,
        r: rhai::INT,
        g: rhai::INT,
        b: rhai::INT,
        a: rhai::INT,
    ) -> bool {
        let color = color_from_ints(r, g, b, a);
        let tree = self.tree();
        match tree.node(id).map(|node| node.kind.clone()) {
            Some(NodeKind::Text(text)) => {
                tree.set_text_style(id, text.font_size, Some(color), text.border)
            }
            _ => false,
        }
    }

    fn text_border(&mut self, id: &str, border: bool) -> bool {
        let tree = self.tree();
        match tree.node(id).map(|node| node.kind.clone()) {
            Some(NodeKind::Text(text)) => {
                tree.set_text_style(id, text.font_size, text.color, border)
            }
            _ => false,
        }
    }

    fn text_size(&mut self, id: &str, font_size: rhai::INT) -> bool {
        let tree = self.tree();
        match tree.node(id).map(|node| node.kind.clone()) {
            Some(NodeKind::Text(text)) => {
                tree.set_text_style(id, font_size as i32, text.color, text.border)
            }
            _ => false,
        }
    }

    fn create_button(
        &mut self,
        id: &str,
        x: rhai::INT,
        y: rhai::INT,
        w: rhai::INT,
        h: rhai::INT,
        label: &str,
    ) {
        let props = ButtonProps::at(x as i32, y as i32, w as i32, h as i32, label);
        self.tree().create_node(id, NodeKind::Button(props));
    }

    fn button_bounds(
        &mut self,
        id: &str,
        x: rhai::INT,
        y: rhai::INT,
        w: rhai::INT,
        h: rhai::INT,
    ) -> bool {
        self.tree().set_button_bounds(id, x as i32, y as i32, w as i32, h as i32)
    }

    fn button_color(
        &mut self,
        id: &str,
        r: rhai::INT,
        g: rhai::INT,
        b: rhai::INT,
        a: rhai::INT,
    ) -> bool {
        self.tree().set_button_color(id, color_from_ints(r, g, b, a))
    }

    fn button_label(&mut self, id: &str, label: &str) -> bool {
        self.tree().set_button_label(id, label)
    }

    fn button_text_size(&mut self, id: &str, font_size: rhai::INT) -> bool {
        self.tree().set_button_font_size(id, font_size as i32)
    }

    fn create_raw_text(&mut self, id: &str, content: &str) {
        self.tree().create_node(id, NodeKind::RawText(content.to_owned()));
    }

    fn set_raw_text(&mut self, id: &str, content: &str) -> bool {
        self.tree().set_raw_text(id, content)
    }

    fn append_child(&mut self, parent_id: &str, child_id: &str) {
        self.tree().append_child(parent_id, child_id);
    }

    fn insert_before(&mut self, parent_id: &str, child_id: &str, before_id: &str) {
        self.tree().insert_before(parent_id, child_id, before_id);
    }

    fn remove_child(&mut self, parent_id: &str, child_id: &str) {
        self.tree().remove_child(parent_id, child_id);
    }

    fn destroy_node(&mut self, id: &str) {
        self.tree().destroy_node(id);
    }

    fn clear_root(&mut self) {
        self.tree().clear_root();
    }

    /// Publishes the back buffer immediately; the runtime also swaps once
    /// per loop iteration.
    fn commit(&mut self) {
        self.tree().swap();
    }

    fn set_timeout(&mut self, callback: &str, delay_ms: rhai::INT) -> rhai::INT {
        let delay = Duration::from_millis(delay_ms.max(0) as u64);
        let now = self.now;
        self.timers().set_timeout(callback.to_owned(), delay, now) as rhai::INT
    }

    fn set_interval(&mut self, callback: &str, every_ms: rhai::INT) -> rhai::INT {
        let every = Duration::from_millis(every_ms.max(0) as u64);
        let now = self.now;
        self.timers().set_interval(callback.to_owned(), every, now) as rhai::INT
    }

    // Timeout and interval ids share one space; clearing either way works.
    fn clear_timer(&mut self, id: rhai::INT) {
        if let Ok(id) = TimerId::try_from(id) {
            self.timers().clear(id);
        }
    }

    fn has_node(&mut self, id: &str) -> bool {
        self.tree().node(id).is_some()
    }

    fn raw_text(&mut self, id: &str) -> String {
        match self.tree().node(id).map(|node| &node.kind) {
            Some(NodeKind::RawText(content)) => content.clone(),
            _ => String::new(),
        }
    }

    fn log(&mut self, message: &str) {
        println!("[script] {message}");
    }

    fn random_range(&mut self, min: rhai::FLOAT, max: rhai::FLOAT) -> rhai::FLOAT {
        if !(max > min) {
            return min;
        }
        let mut rng = rand::thread_rng();
        rng.gen_range(min..max)
    }
}

fn color_from_ints(r: rhai::INT, g: rhai::INT, b: rhai::INT, a: rhai::INT) -> Color {
    let channel = |value: rhai::INT| value.clamp(0, 255) as u8;
    Color::rgba(channel(r), channel(g), channel(b), channel(a))
}

fn register_api(engine: &mut Engine) {
    engine.register_type_with_name::<ScriptApi>("Ui");
    engine.register_fn("create_rect", ScriptApi::create_rect);
    engine.register_fn("rect_bounds", ScriptApi::rect_bounds);
    engine.register_fn("rect_fill", ScriptApi::rect_fill);
    engine.register_fn("rect_no_fill", ScriptApi::rect_no_fill);
    engine.register_fn("rect_outline", ScriptApi::rect_outline);
    engine.register_fn("rect_no_outline", ScriptApi::rect_no_outline);
    engine.register_fn("create_text", ScriptApi::create_text);
    engine.register_fn("text_color", ScriptApi::text_color);
    engine.register_fn("text_border", ScriptApi::text_border);
    engine.register_fn("text_size", ScriptApi::text_size);
    engine.register_fn("create_button", ScriptApi::create_button);
    engine.register_fn("button_bounds", ScriptApi::button_bounds);
    engine.register_fn("button_color", ScriptApi::button_color);
    engine.register_fn("button_label", ScriptApi::button_label);
    engine.register_fn("button_text_size", ScriptApi::button_text_size);
    engine.register_fn("create_raw_text", ScriptApi::create_raw_text);
    engine.register_fn("set_raw_text", ScriptApi::set_raw_text);
    engine.register_fn("append_child", ScriptApi::append_child);
    engine.register_fn("insert_before", ScriptApi::insert_before);
    engine.register_fn("remove_child", ScriptApi::remove_child);
    engine.register_fn("destroy_node", ScriptApi::destroy_node);
    engine.register_fn("clear_root", ScriptApi::clear_root);
    engine.register_fn("commit", ScriptApi::commit);
    engine.register_fn("set_timeout", ScriptApi::set_timeout);
    engine.register_fn("set_interval", ScriptApi::set_interval);
    engine.register_fn("clear_timeout", ScriptApi::clear_timer);
    engine.register_fn("clear_interval", ScriptApi::clear_timer);
    engine.register_fn("has_node", ScriptApi::has_node);
    engine.register_fn("raw_text", ScriptApi::raw_text);
    engine.register_fn("log", ScriptApi::log);
    engine.register_fn("rand", ScriptApi::random_range);
}

enum CallOutcome {
    Done,
    Missing,
    Failed(String),
}

fn call_entry(
    engine: &Engine,
    scope: &mut Scope<'static>,
    ast: &AST,
    name: &str,
    args: impl FuncArgs,
) -> CallOutcome {
    match engine.call_fn::<rhai::Dynamic>(scope, ast, name, args) {
        Ok(_) => CallOutcome::Done,
        Err(err) => {
            if matches!(err.as_ref(), EvalAltResult::ErrorFunctionNotFound(..)) {
                CallOutcome::Missing
            } else {
                CallOutcome::Failed(err.to_string())
            }
        }
    }
}

/// Script-side boundary of the runtime. Compiles the UI script, re-reads it
/// when the file changes, owns the timer table, and dispatches the three
/// script entry points: `init(api)`, `update(api, dt)` and
/// `on_input(api, id, event)`. A raising entry point is logged and
/// swallowed; the event or timer that triggered it is still consumed.
pub struct ScriptHost {
    engine: Engine,
    ast: Option<AST>,
    scope: Scope<'static>,
    script_path: PathBuf,
    last_modified: Option<SystemTime>,
    error: Option<String>,
    initialized: bool,
    timers: TimerScheduler<String>,
}

impl ScriptHost {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let mut engine = Engine::new();
        engine.set_fast_operators(true);
        register_api(&mut engine);
        Self {
            engine,
            ast: None,
            scope: Scope::new(),
            script_path: path.as_ref().to_path_buf(),
            last_modified: None,
            error: None,
            initialized: false,
            timers: TimerScheduler::new(),
        }
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn timers(&self) -> &TimerScheduler<String> {
        &self.timers
    }

    pub fn force_reload(&mut self) -> Result<()> {
        self.load_script()
    }

    /// One script-thread iteration: drain pending input events into
    /// `on_input`, fire due timers, then call `update`. Never panics on
    /// script failures; they land in `last_error` or the log.
    pub fn pump(&mut self, tree: &mut SceneTree, queue: &EventQueue, now: Instant, dt: f32) {
        if let Err(err) = self.reload_if_needed() {
            self.error = Some(err.to_string());
            return;
        }
        let Some(ast) = self.ast.as_ref() else { return };

        if !self.initialized {
            let api = ScriptApi::new(tree, &mut self.timers, now);
            match call_entry(&self.engine, &mut self.scope, ast, "init", (api,)) {
                CallOutcome::Done | CallOutcome::Missing => {
                    self.initialized = true;
                    self.error = None;
                }
                CallOutcome::Failed(err) => {
                    self.error = Some(err);
                    return;
                }
            }
        }

        while let Some(event) = queue.pop() {
            let api = ScriptApi::new(tree, &mut self.timers, now);
            let args = (api, event.target.clone(), event.kind.as_str().to_owned());
            if let CallOutcome::Failed(err) =
                call_entry(&self.engine, &mut self.scope, ast, "on_input", args)
            {
                eprintln!("[script] on_input({event}) failed: {err}");
            }
        }

        for id in self.timers.due(now) {
            let Some(callback) = self.timers.begin_fire(id) else { continue };
            let api = ScriptApi::new(tree, &mut self.timers, now);
            match call_entry(&self.engine, &mut self.scope, ast, &callback, (api,)) {
                CallOutcome::Done => {}
                CallOutcome::Missing => {
                    eprintln!("[script] timer {id} refers to unknown function '{callback}'");
                }
                CallOutcome::Failed(err) => {
                    eprintln!("[script] timer {id} callback '{callback}' failed: {err}");
                }
            }
            self.timers.finish_fire(id, now);
        }

        let api = ScriptApi::new(tree, &mut self.timers, now);
        match call_entry(&self.engine, &mut self.scope, ast, "update", (api, dt as f64)) {
            CallOutcome::Done | CallOutcome::Missing => self.error = None,
            CallOutcome::Failed(err) => self.error = Some(err),
        }
    }

    fn reload_if_needed(&mut self) -> Result<()> {
        let metadata = fs::metadata(&self.script_path)
            .with_context(|| format!("Script file not accessible: {}", self.script_path.display()))?;
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if self.ast.is_none() || self.last_modified.map_or(true, |prev| modified > prev) {
            self.load_script()?;
        }
        Ok(())
    }

    fn load_script(&mut self) -> Result<()> {
        let source = fs::read_to_string(&self.script_path)
            .with_context(|| format!("Reading {}", self.script_path.display()))?;
        let ast = self.engine.compile(source).with_context(|| "Compiling UI script")?;
        self.scope = Scope::new();
        // Pending timers point at functions from the old program text.
        self.timers = TimerScheduler::new();
        self.last_modified =
            fs::metadata(&self.script_path).ok().and_then(|meta| meta.modified().ok());
        self.initialized = false;
        self.error = None;
        self.ast = Some(ast);
        Ok(())
    }
}

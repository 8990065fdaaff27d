use anyhow::Result;
use std::time::Duration;

use tern_ui::cli::CliArgs;
use tern_ui::config::AppConfig;
use tern_ui::harness::{run_fixture, HarnessFixture};
use tern_ui::input::{InputDevices, PointerSample};
use tern_ui::render::{draw_snapshot, RecordingSurface};

fn main() -> Result<()> {
    let args = CliArgs::parse_from_env()?;
    let config_path = args.config.clone().unwrap_or_else(|| "tern_ui.json".to_string());
    let fixture_path = args.fixture.clone();
    let config = AppConfig::load_or_default(&config_path).apply_overrides(args.into_config_overrides());

    if let Some(path) = fixture_path {
        let fixture = HarnessFixture::load(&path)?;
        let report = run_fixture(&fixture)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    run_demo(&config)
}

/// Headless demo: the script thread runs the configured UI script while
/// this thread plays the render/input side with a synthetic pointer sweep.
fn run_demo(config: &AppConfig) -> Result<()> {
    let handle = tern_ui::start(config)?;
    let view = handle.view().clone();
    let queue = handle.queue().clone();

    let mut devices = InputDevices::new();
    let mut surface = RecordingSurface::new();
    let frames = config.demo.frames.max(1);
    let frame_time = Duration::from_secs(1) / config.script.tick_hz.max(1);

    let press_at = frames * 2 / 5;
    let release_at = frames * 3 / 5;

    for frame in 0..frames {
        let t = frame as f32 / frames as f32;
        let sample = PointerSample {
            x: (config.display.width as f32 * t) as i32,
            // Sweep through the lower third, where decks keep their buttons.
            y: config.display.height * 3 / 5,
            down: (press_at..release_at).contains(&frame),
        };
        devices.poll_pointer(sample, &view, &queue);

        surface.clear();
        {
            let guard = view.render_lock();
            draw_snapshot(guard.snapshot(), &devices, &mut surface);
        }

        if frame % 30 == 0 {
            println!(
                "[demo] frame {frame}: {} draw calls, {} events queued",
                surface.calls.len(),
                queue.len()
            );
        }
        std::thread::sleep(frame_time);
    }

    let node_count = view.render_lock().snapshot().len();
    println!("[demo] done: {node_count} nodes in the last snapshot");
    handle.shutdown();
    Ok(())
}

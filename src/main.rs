use std::any::Any;
use std::env;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use winit::event_loop::EventLoop;
use winit::monitor::MonitorHandle;

use sfml_lua::{DisplayProvider, LuaScriptHost, StaticDisplay, VideoMode};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let display: Arc<dyn DisplayProvider + Send + Sync> = match &options.display_profile {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read display profile {path}"))?;
            let display = StaticDisplay::from_xml(&xml)
                .with_context(|| format!("failed to parse display profile {path}"))?;
            Arc::new(display)
        }
        None => match probe_display() {
            Ok(display) => Arc::new(display),
            Err(err) => {
                warn!("{err}; using headless display modes");
                Arc::new(StaticDisplay::headless())
            }
        },
    };

    if options.list_modes {
        println!("Desktop mode: {}", display.desktop_mode());
        let modes = display.fullscreen_modes();
        println!("Fullscreen modes ({}):", modes.len());
        for mode in modes {
            println!(" - {mode}");
        }
    }

    if options.scripts.is_empty() {
        return Ok(());
    }

    let host = LuaScriptHost::new(display)?;
    for script in &options.scripts {
        host.run_file(script)
            .with_context(|| format!("script {script} failed"))?;
    }
    info!("ran {} script(s)", options.scripts.len());
    Ok(())
}

/// Reads the monitor list from the windowing system.
fn probe_display() -> Result<StaticDisplay> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop.map_err(|panic| {
        anyhow!("failed to initialize event loop: {}", panic_text(panic.as_ref()))
    })?;

    let mut modes = Vec::new();
    for monitor in event_loop.available_monitors() {
        for mode in monitor.video_modes() {
            let size = mode.size();
            let mode = VideoMode::new(size.width, size.height, u32::from(mode.bit_depth()));
            if !modes.contains(&mode) {
                modes.push(mode);
            }
        }
    }

    let desktop = event_loop
        .primary_monitor()
        .or_else(|| event_loop.available_monitors().next())
        .map(|monitor| desktop_mode(&monitor))
        .or_else(|| modes.first().copied())
        .ok_or_else(|| anyhow!("no monitor reported by the windowing system"))?;

    if modes.is_empty() {
        modes.push(desktop);
    }
    Ok(StaticDisplay::new(desktop, modes))
}

fn desktop_mode(monitor: &MonitorHandle) -> VideoMode {
    let size = monitor.size();
    let bits_per_pixel = monitor
        .video_modes()
        .find(|mode| mode.size() == size)
        .map(|mode| u32::from(mode.bit_depth()))
        .unwrap_or(VideoMode::DEFAULT_BITS_PER_PIXEL);
    VideoMode::new(size.width, size.height, bits_per_pixel)
}

fn panic_text(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&'static str>().copied())
        .unwrap_or("unknown panic")
}

const USAGE: &str = "Usage: sfml-lua [--display-profile <profile.xml>] [--list-modes] [script.lua ...]";

struct CliOptions {
    display_profile: Option<String>,
    list_modes: bool,
    scripts: Vec<String>,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut display_profile = None;
        let mut list_modes = false;
        let mut scripts = Vec::new();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--display-profile" => {
                    let path = args
                        .next()
                        .ok_or_else(|| anyhow!("--display-profile expects a path. {USAGE}"))?;
                    display_profile = Some(path);
                }
                "--list-modes" => list_modes = true,
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
                _ => scripts.push(arg),
            }
        }
        if scripts.is_empty() && !list_modes {
            return Err(anyhow!(USAGE));
        }
        Ok(Self {
            display_profile,
            list_modes,
            scripts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_become_messages() {
        let owned = panic::catch_unwind(|| panic!("{} display", "no")).unwrap_err();
        assert_eq!(panic_text(owned.as_ref()), "no display");
        let borrowed = panic::catch_unwind(|| panic!("static text")).unwrap_err();
        assert_eq!(panic_text(borrowed.as_ref()), "static text");
        let other = panic::catch_unwind(|| std::panic::panic_any(7_u8)).unwrap_err();
        assert_eq!(panic_text(other.as_ref()), "unknown panic");
    }
}

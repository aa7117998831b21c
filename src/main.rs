use std::{
    fs::File,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{EnableMouseCapture, KeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{self, EnterAlternateScreen, enable_raw_mode, supports_keyboard_enhancement},
};
use log::{error, info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use roview::event_source::KeyboardEventSource;
use roview::frame::{DEFAULT_FPS, FrameLoop};
use roview::input::InputMapper;
use roview::kitty::{KittyGraphics, ScreenGeometry, set_tmux_mode};
use roview::panic_handler::{initialize_panic_handler, restore_terminal};
use roview::pdf::DocumentRenderer;
use roview::terminal::detect_terminal;
use roview::viewer::{Viewer, ViewerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Page-at-a-time PDF viewer for Kitty graphics terminals")]
struct Args {
    /// Document to open
    document: PathBuf,
    /// Frames per second; terminals do not report the display refresh rate
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,
    /// Write the log to this file (stdout belongs to the viewer)
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Log verbosity: off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        if let Err(err) = init_logging(path, args.log_level) {
            eprintln!("roview: cannot start logging to {}: {err}", path.display());
        }
    }

    info!("Starting roview on {}", args.document.display());

    let document = match DocumentRenderer::open(&args.document) {
        Ok(document) => document,
        Err(err) => {
            error!("{err}");
            eprintln!("roview: {err}");
            return ExitCode::FAILURE;
        }
    };

    let caps = detect_terminal();
    set_tmux_mode(caps.env.tmux);
    if !caps.kitty_graphics {
        warn!(
            "Terminal {:?} may not support Kitty graphics; pages may not appear",
            caps.kind
        );
    }

    initialize_panic_handler();

    match run(document, args.fps) {
        Ok(()) => {
            info!("Shutting down roview");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Application error: {err:?}");
            eprintln!("{err:?}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(path: &Path, level: LevelFilter) -> Result<()> {
    WriteLogger::init(level, Config::default(), File::create(path)?)?;
    Ok(())
}

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run `setup`, calling `restore` to undo whatever it got done when it fails
fn setup_or_restore<T>(setup: impl FnOnce() -> Result<T>, restore: impl FnOnce()) -> Result<T> {
    setup().map_err(|err| {
        restore();
        err.context("Terminal setup failed")
    })
}

/// Raw mode, alternate screen, mouse capture and, where supported, key
/// release reporting. Returns the terminal and whether releases are reported.
fn setup_terminal() -> Result<(Tui, bool)> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let release_events = matches!(supports_keyboard_enhancement(), Ok(true));
    if release_events {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }
    info!("Key release reporting: {release_events}");

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.hide_cursor()?;
    Ok((terminal, release_events))
}

fn run(document: DocumentRenderer, fps: u32) -> Result<()> {
    let (mut terminal, release_events) = setup_or_restore(setup_terminal, restore_terminal)?;

    let screen = current_screen();
    info!(
        "Screen {}x{} cells of {}x{} px",
        screen.columns, screen.rows, screen.cell.width, screen.cell.height
    );

    let mut gfx = KittyGraphics::new(std::io::stdout(), screen);
    let mut viewer = Viewer::start(document, screen.viewport(), ViewerConfig::default(), &mut gfx);
    let mut events = KeyboardEventSource;
    let mut mapper = InputMapper::new(release_events);

    let res = FrameLoop::new(fps).run(
        &mut viewer,
        &mut gfx,
        &mut terminal,
        &mut events,
        &mut mapper,
        screen_for,
    );

    // Restore terminal
    viewer.shutdown(&mut gfx);
    if let Err(err) = gfx.delete_all() {
        warn!("Failed to clear images: {err}");
    }
    restore_terminal();
    terminal.show_cursor()?;

    let frames = res?;
    info!("Presented {frames} frames");
    Ok(())
}

fn current_screen() -> ScreenGeometry {
    match terminal::window_size() {
        Ok(size) => ScreenGeometry::from_window_size(size),
        Err(err) => {
            warn!("Window size query failed: {err}");
            let (columns, rows) = terminal::size().unwrap_or((100, 75));
            ScreenGeometry::from_cells(columns, rows)
        }
    }
}

fn screen_for(columns: u16, rows: u16) -> ScreenGeometry {
    match terminal::window_size() {
        Ok(size) => ScreenGeometry::from_window_size(size),
        Err(_) => ScreenGeometry::from_cells(columns, rows),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn failed_setup_restores_terminal() {
        let restored = Cell::new(0);
        let result: Result<()> = setup_or_restore(
            || Err(anyhow::anyhow!("no tty")),
            || restored.set(restored.get() + 1),
        );

        let err = result.unwrap_err();
        assert_eq!(restored.get(), 1);
        assert!(format!("{err:#}").contains("no tty"));
    }

    #[test]
    fn successful_setup_leaves_terminal_alone() {
        let restored = Cell::new(false);
        let value = setup_or_restore(|| Ok(7), || restored.set(true)).unwrap();

        assert_eq!(value, 7);
        assert!(!restored.get());
    }
}

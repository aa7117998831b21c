use crossterm::{
    event::{DisableMouseCapture, PopKeyboardEnhancementFlags},
    execute,
    terminal::{LeaveAlternateScreen, disable_raw_mode},
};
use std::io::{self, Write};
use std::panic;

use crate::kitty::DeleteCommand;

pub fn initialize_panic_handler() {
    better_panic::install();

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Free page images so they do not outlive the process in terminal memory
        clear_images();
        restore_terminal();

        default_hook(panic_info);

        std::process::exit(1);
    }));
}

/// Delete every Kitty image this process may have transmitted
pub fn clear_images() {
    let mut stdout = io::stdout();
    let _ = DeleteCommand::all().delete().write_to(&mut stdout);
    let _ = stdout.flush();
}

/// Restore terminal to a clean state
///
/// Specifically handles:
/// - Disabling raw mode
/// - Popping keyboard enhancement flags
/// - Exiting alternate screen
/// - Disabling mouse capture (important for restoring mouse functionality)
/// - Showing the cursor
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    let _ = execute!(io::stderr(), crossterm::cursor::Show);
    let _ = writeln!(io::stderr());
}

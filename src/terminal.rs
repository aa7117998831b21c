//! Terminal detection
//!
//! The viewer draws pages through the Kitty graphics protocol. Detection is
//! best effort from the environment; an unsupported terminal still runs, it
//! just shows the outline and text without the page image.

use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalKind {
    Kitty,
    Ghostty,
    WezTerm,
    Konsole,
    Tmux,
    Unknown,
}

#[derive(Clone, Debug, Default)]
pub struct TerminalEnv {
    pub term_program: String,
    pub term: String,
    pub kitty_window: bool,
    pub wezterm_executable: bool,
    pub konsole: bool,
    pub tmux: bool,
}

impl TerminalEnv {
    pub fn read() -> Self {
        let lower = |name: &str| {
            env::var(name)
                .ok()
                .map(|v| v.to_ascii_lowercase())
                .unwrap_or_default()
        };
        Self {
            term_program: lower("TERM_PROGRAM"),
            term: lower("TERM"),
            kitty_window: env::var("KITTY_WINDOW_ID").is_ok() || env::var("KITTY_PID").is_ok(),
            wezterm_executable: env::var("WEZTERM_EXECUTABLE").is_ok(),
            konsole: env::var("KONSOLE_VERSION").is_ok(),
            tmux: env::var("TMUX").is_ok(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TerminalCapabilities {
    pub env: TerminalEnv,
    pub kind: TerminalKind,
    /// Kitty graphics placements are expected to work
    pub kitty_graphics: bool,
}

pub fn detect_terminal() -> TerminalCapabilities {
    detect_terminal_from_env(TerminalEnv::read())
}

pub fn detect_terminal_from_env(env: TerminalEnv) -> TerminalCapabilities {
    let kind = detect_kind(&env);
    let kitty_graphics = match kind {
        TerminalKind::Kitty
        | TerminalKind::Ghostty
        | TerminalKind::WezTerm
        | TerminalKind::Konsole => true,
        // Inside tmux the outer terminal decides; trust its markers
        TerminalKind::Tmux => env.kitty_window || env.term.contains("kitty"),
        TerminalKind::Unknown => false,
    };
    TerminalCapabilities {
        env,
        kind,
        kitty_graphics,
    }
}

fn detect_kind(env: &TerminalEnv) -> TerminalKind {
    if env.term_program == "kitty" {
        return TerminalKind::Kitty;
    }
    if env.term_program == "ghostty" {
        return TerminalKind::Ghostty;
    }
    if env.term_program == "wezterm" || env.wezterm_executable {
        return TerminalKind::WezTerm;
    }
    if env.term_program == "konsole" || env.konsole {
        return TerminalKind::Konsole;
    }
    if env.tmux {
        return TerminalKind::Tmux;
    }
    if env.kitty_window || env.term.contains("kitty") {
        return TerminalKind::Kitty;
    }
    if env.term.contains("ghostty") {
        return TerminalKind::Ghostty;
    }
    TerminalKind::Unknown
}

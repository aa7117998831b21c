//! Terminal events to per-frame viewer input
//!
//! Scroll keys are level-triggered in the viewer: they scroll for as long
//! as they are held. Terminals with keyboard enhancement report releases, so
//! a key is held from its press to its release. Everywhere else only presses
//! and auto-repeats arrive. The first press then holds the key long enough to
//! bridge the terminal's auto-repeat delay, and each repeat after that
//! extends the hold by a short grace period.

use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use log::trace;

use crate::viewer::{Action, Command, FrameInput};

/// How long a first press holds a key without release reporting; longer
/// than the usual 250-600 ms auto-repeat delay
pub const FIRST_PRESS_HOLD: Duration = Duration::from_millis(650);

/// How long an auto-repeat holds a key without release reporting
pub const REPEAT_HOLD: Duration = Duration::from_millis(150);

#[derive(Clone, Copy, Debug, Default)]
struct HeldKey {
    down: bool,
    last_press: Option<Instant>,
    repeating: bool,
}

impl HeldKey {
    fn press(&mut self, now: Instant) {
        // A press while still held is an auto-repeat of the same hold
        self.repeating = self.within_hold(now);
        self.down = true;
        self.last_press = Some(now);
    }

    fn release(&mut self) {
        *self = Self::default();
    }

    fn within_hold(&self, now: Instant) -> bool {
        let hold = if self.repeating {
            REPEAT_HOLD
        } else {
            FIRST_PRESS_HOLD
        };
        self.last_press
            .is_some_and(|at| now.saturating_duration_since(at) <= hold)
    }

    fn is_held(&self, release_events: bool, now: Instant) -> bool {
        if release_events {
            self.down
        } else {
            self.within_hold(now)
        }
    }
}

/// Direction of a held scroll key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScrollKey {
    Up,
    Down,
}

/// Accumulates terminal events between frames
pub struct InputMapper {
    release_events: bool,
    up: HeldKey,
    down: HeldKey,
    pending: FrameInput,
    resize: Option<(u16, u16)>,
}

impl InputMapper {
    /// `release_events` says whether the terminal reports key releases
    pub fn new(release_events: bool) -> Self {
        Self {
            release_events,
            up: HeldKey::default(),
            down: HeldKey::default(),
            pending: FrameInput::default(),
            resize: None,
        }
    }

    pub fn handle(&mut self, event: &Event, now: Instant) {
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => self.pending.wheel += 1.0,
                MouseEventKind::ScrollDown => self.pending.wheel -= 1.0,
                _ => {}
            },
            Event::Resize(columns, rows) => self.resize = Some((*columns, *rows)),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) {
        if let Some(dir) = scroll_key(key.code) {
            let held = match dir {
                ScrollKey::Up => &mut self.up,
                ScrollKey::Down => &mut self.down,
            };
            match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => held.press(now),
                KeyEventKind::Release => held.release(),
            }
            return;
        }

        if key.kind == KeyEventKind::Release {
            return;
        }

        if is_quit(key) {
            self.pending.quit = true;
            return;
        }

        if let Some(action) = key_action(key.code) {
            trace!("{:?} -> {action:?}", key.code);
            self.pending.actions.push(action);
        }
    }

    /// Terminal size in cells from the last resize event, if any
    pub fn take_resize(&mut self) -> Option<(u16, u16)> {
        self.resize.take()
    }

    /// Input collected since the previous frame, with held keys sampled now
    pub fn take_frame(&mut self, now: Instant) -> FrameInput {
        let mut input = std::mem::take(&mut self.pending);
        input.scroll_up_held = self.up.is_held(self.release_events, now);
        input.scroll_down_held = self.down.is_held(self.release_events, now);
        input
    }
}

fn scroll_key(code: KeyCode) -> Option<ScrollKey> {
    match code {
        KeyCode::Up | KeyCode::Char('w' | 'W') => Some(ScrollKey::Up),
        KeyCode::Down | KeyCode::Char('s' | 'S') => Some(ScrollKey::Down),
        _ => None,
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn key_action(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Right | KeyCode::Char('d' | 'D') => Action::Navigate(Command::NextPage),
        KeyCode::Left | KeyCode::Char('a' | 'A') => Action::Navigate(Command::PreviousPage),
        KeyCode::Home => Action::Navigate(Command::FirstPage),
        KeyCode::End => Action::Navigate(Command::LastPage),
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Char('r' | 'R') => Action::ScrollToTop,
        KeyCode::Char(c @ '1'..='9') => {
            let page = c.to_digit(10)? as usize - 1;
            Action::Navigate(Command::GoToPage(page))
        }
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_source::SimulatedEventSource;

    fn feed(mapper: &mut InputMapper, events: &[Event], now: Instant) {
        for event in events {
            mapper.handle(event, now);
        }
    }

    #[test]
    fn navigation_keys_map_to_commands_in_order() {
        let mut mapper = InputMapper::new(false);
        let now = Instant::now();
        feed(
            &mut mapper,
            &[
                SimulatedEventSource::key(KeyCode::Right),
                SimulatedEventSource::char_key('a'),
                SimulatedEventSource::char_key('3'),
                SimulatedEventSource::key(KeyCode::End),
                SimulatedEventSource::key(KeyCode::Home),
                SimulatedEventSource::key(KeyCode::PageDown),
                SimulatedEventSource::char_key('r'),
            ],
            now,
        );

        let input = mapper.take_frame(now);
        assert_eq!(
            input.actions,
            vec![
                Action::Navigate(Command::NextPage),
                Action::Navigate(Command::PreviousPage),
                Action::Navigate(Command::GoToPage(2)),
                Action::Navigate(Command::LastPage),
                Action::Navigate(Command::FirstPage),
                Action::PageDown,
                Action::ScrollToTop,
            ]
        );
        assert!(!input.quit);
        assert!(mapper.take_frame(now).is_idle());
    }

    #[test]
    fn zero_is_not_a_page_key() {
        let mut mapper = InputMapper::new(false);
        let now = Instant::now();
        mapper.handle(&SimulatedEventSource::char_key('0'), now);
        assert!(mapper.take_frame(now).is_idle());
    }

    #[test]
    fn quit_keys() {
        for event in [
            SimulatedEventSource::key(KeyCode::Esc),
            SimulatedEventSource::char_key('q'),
            SimulatedEventSource::ctrl_char_key('c'),
        ] {
            let mut mapper = InputMapper::new(false);
            let now = Instant::now();
            mapper.handle(&event, now);
            assert!(mapper.take_frame(now).quit, "{event:?}");
        }

        let mut mapper = InputMapper::new(false);
        let now = Instant::now();
        mapper.handle(&SimulatedEventSource::char_key('c'), now);
        assert!(!mapper.take_frame(now).quit);
    }

    #[test]
    fn wheel_notches_accumulate() {
        let mut mapper = InputMapper::new(false);
        let now = Instant::now();
        feed(
            &mut mapper,
            &[
                SimulatedEventSource::wheel(false),
                SimulatedEventSource::wheel(false),
                SimulatedEventSource::wheel(true),
            ],
            now,
        );
        assert_eq!(mapper.take_frame(now).wheel, -1.0);
    }

    #[test]
    fn held_key_with_release_events() {
        let mut mapper = InputMapper::new(true);
        let start = Instant::now();
        mapper.handle(&SimulatedEventSource::key(KeyCode::Down), start);

        let later = start + Duration::from_secs(2);
        let input = mapper.take_frame(later);
        assert!(input.scroll_down_held);
        assert!(!input.scroll_up_held);

        mapper.handle(&SimulatedEventSource::key_release(KeyCode::Down), later);
        assert!(!mapper.take_frame(later).scroll_down_held);
    }

    #[test]
    fn held_key_without_release_events_expires() {
        let mut mapper = InputMapper::new(false);
        let start = Instant::now();
        mapper.handle(&SimulatedEventSource::char_key('w'), start);

        assert!(mapper.take_frame(start + FIRST_PRESS_HOLD / 2).scroll_up_held);
        assert!(!mapper.take_frame(start + FIRST_PRESS_HOLD * 2).scroll_up_held);
    }

    #[test]
    fn held_key_bridges_auto_repeat_delay() {
        let mut mapper = InputMapper::new(false);
        let start = Instant::now();
        let ms = |n: u64| start + Duration::from_millis(n);
        mapper.handle(&SimulatedEventSource::key(KeyCode::Down), start);

        // Nothing arrives until the first auto-repeat at +500 ms
        for at in [16, 100, 160, 250, 400, 490] {
            assert!(mapper.take_frame(ms(at)).scroll_down_held, "+{at} ms");
        }

        // Repeats every 33 ms while the key stays down
        let mut last = 500;
        while last <= 800 {
            mapper.handle(&SimulatedEventSource::key(KeyCode::Down), ms(last));
            assert!(mapper.take_frame(ms(last + 16)).scroll_down_held, "+{last} ms");
            last += 33;
        }

        // Once repeating, the hold lapses shortly after the last repeat
        let released = last - 33;
        assert!(mapper.take_frame(ms(released + 100)).scroll_down_held);
        assert!(!mapper.take_frame(ms(released + 200)).scroll_down_held);
    }

    #[test]
    fn tap_after_hold_lapses_starts_a_new_hold() {
        let mut mapper = InputMapper::new(false);
        let start = Instant::now();
        let ms = |n: u64| start + Duration::from_millis(n);
        mapper.handle(&SimulatedEventSource::key(KeyCode::Up), start);
        mapper.handle(&SimulatedEventSource::key(KeyCode::Up), ms(500));
        assert!(!mapper.take_frame(ms(700)).scroll_up_held);

        // The next press is a fresh hold, so it gets the long first grace
        mapper.handle(&SimulatedEventSource::key(KeyCode::Up), ms(1000));
        assert!(mapper.take_frame(ms(1400)).scroll_up_held);
    }

    #[test]
    fn resize_is_reported_once() {
        let mut mapper = InputMapper::new(false);
        let now = Instant::now();
        mapper.handle(&Event::Resize(80, 24), now);
        mapper.handle(&Event::Resize(120, 40), now);
        assert_eq!(mapper.take_resize(), Some((120, 40)));
        assert_eq!(mapper.take_resize(), None);
    }
}

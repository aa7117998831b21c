use anyhow::Result;
pub use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;

/// Trait for abstracting event sources to enable testing
pub trait EventSource {
    /// Poll for events with a timeout
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Read the next event
    fn read(&mut self) -> Result<Event>;
}

/// Real terminal event source using crossterm
pub struct KeyboardEventSource;

impl EventSource for KeyboardEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        Ok(crossterm::event::poll(timeout)?)
    }

    fn read(&mut self) -> Result<Event> {
        Ok(crossterm::event::read()?)
    }
}

/// Simulated event source for testing.
///
/// Events are grouped into frames: `poll` reports nothing pending at a frame
/// boundary once, so a frame loop drains exactly one group per frame.
pub struct SimulatedEventSource {
    pub(crate) frames: Vec<Vec<Event>>,
    frame_index: usize,
    event_index: usize,
}

impl SimulatedEventSource {
    /// All events delivered in a single frame
    pub fn new(events: Vec<Event>) -> Self {
        Self::with_frames(vec![events])
    }

    /// One group of events per frame
    pub fn with_frames(frames: Vec<Vec<Event>>) -> Self {
        Self {
            frames,
            frame_index: 0,
            event_index: 0,
        }
    }

    /// Whether every event has been read
    pub fn is_exhausted(&self) -> bool {
        self.frame_index >= self.frames.len()
    }

    /// Helper method to create a key event
    pub fn key_event(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        })
    }

    /// Helper method to create a key release, as reported with keyboard
    /// enhancement enabled
    pub fn key_release(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Release,
            state: KeyEventState::empty(),
        })
    }

    /// Helper method to create a simple key press
    pub fn key(code: KeyCode) -> Event {
        Self::key_event(code, KeyModifiers::empty())
    }

    /// Helper method to create a simple character key event
    pub fn char_key(c: char) -> Event {
        Self::key_event(KeyCode::Char(c), KeyModifiers::empty())
    }

    /// Helper method to create a Ctrl+char key event
    pub fn ctrl_char_key(c: char) -> Event {
        Self::key_event(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Helper method to create a mouse wheel event
    pub fn wheel(up: bool) -> Event {
        Event::Mouse(MouseEvent {
            kind: if up {
                MouseEventKind::ScrollUp
            } else {
                MouseEventKind::ScrollDown
            },
            column: 0,
            row: 0,
            modifiers: KeyModifiers::empty(),
        })
    }
}

impl EventSource for SimulatedEventSource {
    fn poll(&mut self, _timeout: Duration) -> Result<bool> {
        let Some(frame) = self.frames.get(self.frame_index) else {
            return Ok(false);
        };
        if self.event_index < frame.len() {
            return Ok(true);
        }
        // Frame boundary: report empty once and move to the next group
        self.frame_index += 1;
        self.event_index = 0;
        Ok(false)
    }

    fn read(&mut self) -> Result<Event> {
        let event = self
            .frames
            .get(self.frame_index)
            .and_then(|frame| frame.get(self.event_index))
            .cloned();
        match event {
            Some(event) => {
                self.event_index += 1;
                Ok(event)
            }
            // Return a quit event if we've exhausted all events
            None => Ok(SimulatedEventSource::char_key('q')),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_event_source() {
        let events = vec![
            SimulatedEventSource::char_key('d'),
            SimulatedEventSource::key(KeyCode::Down),
            SimulatedEventSource::ctrl_char_key('c'),
        ];

        let mut source = SimulatedEventSource::new(events);

        // Should have events available
        assert!(source.poll(Duration::from_millis(0)).unwrap());

        // Read first event
        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('d'));
            assert!(key.modifiers.is_empty());
        }

        // Read second event
        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Down);
        }

        // Read third event
        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('c'));
            assert!(key.modifiers.contains(KeyModifiers::CONTROL));
        }

        // No more events
        assert!(!source.poll(Duration::from_millis(0)).unwrap());
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_frames_are_separated_by_empty_polls() {
        let mut source = SimulatedEventSource::with_frames(vec![
            vec![SimulatedEventSource::wheel(false)],
            vec![],
            vec![SimulatedEventSource::char_key('q')],
        ]);

        assert!(source.poll(Duration::ZERO).unwrap());
        source.read().unwrap();
        assert!(!source.poll(Duration::ZERO).unwrap());

        // Empty frame
        assert!(!source.poll(Duration::ZERO).unwrap());

        assert!(source.poll(Duration::ZERO).unwrap());
        assert_eq!(source.read().unwrap(), SimulatedEventSource::char_key('q'));
        assert!(!source.poll(Duration::ZERO).unwrap());
        assert!(source.is_exhausted());
    }
}

use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::{Duration, Instant};

/// number of keys on the hex keypad
pub const KEY_COUNT: usize = 16;

/// map of the left-hand side of a qwerty keyboard to the COSMAC hex keypad
///   1 2 3 C      1 2 3 4
///   4 5 6 D  <=  q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); KEY_COUNT] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// Terminals only report key presses, never releases, so a key counts as
/// held for this long after its last press (or auto-repeat) event.
const KEY_HOLD: Duration = Duration::from_millis(150);

/// Key state as the interpreter sees it. `key` is always in 0..16.
pub trait InputPort {
    /// is the key currently held down
    fn is_pressed(&mut self, key: u8) -> io::Result<bool>;

    /// block until a key is pressed and return it. Implementations cancel
    /// the wait by returning an error.
    fn blocking_next_key(&mut self) -> io::Result<u8>;

    /// whether the user asked to stop, checked by the driver between frames
    fn poll_quit(&mut self) -> io::Result<bool> {
        Ok(false)
    }
}

fn cancelled() -> io::Error {
    io::Error::new(io::ErrorKind::Interrupted, "key wait cancelled")
}

/// reads keypresses from the terminal, using crossterm in raw mode
pub struct TerminalInput {
    keymap: HashMap<char, u8>,
    last_pressed: [Option<Instant>; KEY_COUNT],
    quit: bool,
}

impl TerminalInput {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(TerminalInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            last_pressed: [None; KEY_COUNT],
            quit: false,
        })
    }

    /// handle one key event, returning the mapped key if there was one
    fn handle_key(&mut self, evt: KeyEvent) -> Option<u8> {
        match evt.code {
            KeyCode::Esc => {
                self.quit = true;
                None
            }
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true;
                None
            }
            KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                Some(mapped_key) => {
                    self.last_pressed[*mapped_key as usize] = Some(Instant::now());
                    Some(*mapped_key)
                }
                None => {
                    log::warn!("can't map {:?} to a COSMAC key", key);
                    None
                }
            },
            _ => None,
        }
    }

    /// drain whatever events are waiting without blocking
    fn read_pending(&mut self) -> io::Result<()> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                self.handle_key(evt);
            }
        }
        Ok(())
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl InputPort for TerminalInput {
    fn is_pressed(&mut self, key: u8) -> io::Result<bool> {
        self.read_pending()?;
        if self.quit {
            return Err(cancelled());
        }
        Ok(match self.last_pressed[key as usize] {
            Some(at) => at.elapsed() < KEY_HOLD,
            None => false,
        })
    }

    fn poll_quit(&mut self) -> io::Result<bool> {
        self.read_pending()?;
        Ok(self.quit)
    }

    fn blocking_next_key(&mut self) -> io::Result<u8> {
        loop {
            if self.quit {
                return Err(cancelled());
            }
            if let Event::Key(evt) = read()? {
                if let Some(key) = self.handle_key(evt) {
                    return Ok(key);
                }
            }
        }
    }
}

/// scripted Input implementation for testing
#[derive(Default)]
pub struct DummyInput {
    pressed: [bool; KEY_COUNT],
    queued: VecDeque<u8>,
}

impl DummyInput {
    /// `keys` are held down; `queued` are handed out one by one to blocking waits
    pub fn new(keys: &[u8], queued: &[u8]) -> Self {
        let mut pressed = [false; KEY_COUNT];
        for k in keys {
            pressed[*k as usize] = true;
        }
        DummyInput {
            pressed,
            queued: queued.iter().copied().collect(),
        }
    }

    pub fn set_pressed(&mut self, key: u8, pressed: bool) {
        self.pressed[key as usize] = pressed;
    }
}

impl InputPort for DummyInput {
    fn is_pressed(&mut self, key: u8) -> io::Result<bool> {
        Ok(self.pressed[key as usize])
    }

    fn blocking_next_key(&mut self) -> io::Result<u8> {
        // running out of script is as good as the user giving up
        self.queued.pop_front().ok_or_else(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_covers_every_key() {
        let mut seen = [false; KEY_COUNT];
        for (_, k) in CHIP8_CONVENTIONAL_KEYMAP {
            seen[k as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_dummy_pressed() -> io::Result<()> {
        let mut i = DummyInput::new(&[0x3, 0xf], &[]);
        assert!(i.is_pressed(0x3)?);
        assert!(i.is_pressed(0xf)?);
        assert!(!i.is_pressed(0x0)?);
        i.set_pressed(0x3, false);
        assert!(!i.is_pressed(0x3)?);
        Ok(())
    }

    #[test]
    fn test_dummy_queue_then_cancel() {
        let mut i = DummyInput::new(&[], &[0xa, 0x1]);
        assert_eq!(i.blocking_next_key().unwrap(), 0xa);
        assert_eq!(i.blocking_next_key().unwrap(), 0x1);
        let err = i.blocking_next_key().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
    }
}

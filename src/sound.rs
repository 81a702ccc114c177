use beep::beep;
use std::error::Error;

/// The buzzer. CHIP-8 only ever has one tone: it's on while the sound timer
/// is non-zero and off otherwise.
pub trait Sound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
    fn is_beeping(&self) -> bool;

    /// switch the buzzer to match the sound timer, only touching the device
    /// when the state actually changes
    fn follow_timer(&mut self, sound_timer: u8) -> Result<(), Box<dyn Error>> {
        match (sound_timer > 0, self.is_beeping()) {
            (true, false) => self.beep(),
            (false, true) => self.stop(),
            _ => Ok(()),
        }
    }
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// PC speaker buzzer via the beep crate
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Default for SimpleBeep {
    fn default() -> Self {
        Self::new()
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        beep(SIMPLEBEEP_PITCH)?;
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        beep(0)?;
        self.is_beeping = false;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        if self.is_beeping {
            let _ = beep(0);
        }
    }
}

/// silent buzzer; counts how often it was switched, for tests
#[derive(Default)]
pub struct Mute {
    on: bool,
    pub switches: usize,
}

impl Mute {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        self.on = true;
        self.switches += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.on = false;
        self.switches += 1;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_timer_switches_on_edges() -> Result<(), Box<dyn Error>> {
        let mut s = Mute::new();
        s.follow_timer(0)?;
        assert_eq!(s.switches, 0);
        s.follow_timer(5)?;
        s.follow_timer(4)?;
        assert!(s.is_beeping());
        assert_eq!(s.switches, 1);
        s.follow_timer(0)?;
        assert!(!s.is_beeping());
        assert_eq!(s.switches, 2);
        Ok(())
    }
}

use std::error::Error;

use chip8vm::config::Config;
use chip8vm::display::MonoTermDisplay;
use chip8vm::input::TerminalInput;
use chip8vm::interpreter::Chip8Interpreter;
use chip8vm::session::Session;
use chip8vm::sound::{Mute, SimpleBeep, Sound};
use clap::Parser;

// NB. logging goes to stderr, which fights with the terminal display; run
//     with e.g. `RUST_LOG=debug chip8vm rom.ch8 2>chip8.log`
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = Config::parse();

    let result = run(&config);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..4 {
        println!();
    }
    let cycles = result?;
    log::info!("ran {} cycles", cycles);
    Ok(())
}

/// everything that touches the terminal lives in here, so it's all been
/// put back by the time main prints anything
fn run(config: &Config) -> Result<u64, Box<dyn Error>> {
    let image = std::fs::read(&config.rom)?;
    log::debug!("{:?}: {} bytes", config.rom, image.len());

    let mut sound: Box<dyn Sound> = if config.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let mut input = TerminalInput::new()?;
    let mut display = MonoTermDisplay::new()?;

    let mut interpreter = Chip8Interpreter::new(&mut input, config);
    interpreter.load_program(&mut image.as_slice())?;

    let mut session = Session::new(interpreter, &mut display, sound.as_mut(), config);
    Ok(session.run(None)?)
}

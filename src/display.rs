use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// display width in pixels
pub const WIDTH: usize = 64;
/// display height in pixels
pub const HEIGHT: usize = 32;

const FRAME_BYTES: usize = WIDTH * HEIGHT / 8;

// the packed bit-vector must be a whole number of bytes
const _: () = assert!(WIDTH * HEIGHT % 8 == 0);

/// The monochrome screen the interpreter paints on. One bit per pixel,
/// row-major, most significant bit leftmost.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    bits: [u8; FRAME_BYTES],
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            bits: [0; FRAME_BYTES],
        }
    }

    pub fn clear(&mut self) {
        self.bits = [0; FRAME_BYTES];
    }

    /// XOR `bit` onto the pixel at (x, y); coordinates wrap around the
    /// screen edges. Returns true if a lit pixel was turned off.
    pub fn paint(&mut self, x: usize, y: usize, bit: u8) -> bool {
        assert!(bit <= 1, "can only paint 0 or 1, got {}", bit);
        let (byte, mask) = Self::locate(x, y);
        let was_on = self.bits[byte] & mask != 0;
        if bit == 1 {
            self.bits[byte] ^= mask;
        }
        was_on && bit == 1
    }

    /// whether the pixel at (x, y) is lit; coordinates wrap
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let (byte, mask) = Self::locate(x, y);
        self.bits[byte] & mask != 0
    }

    /// read-only view of the packed bits, for renderers
    pub fn snapshot(&self) -> &[u8] {
        &self.bits
    }

    fn locate(x: usize, y: usize) -> (usize, u8) {
        let index = (y % HEIGHT) * WIDTH + (x % WIDTH);
        (index / 8, 0x80 >> (index % 8))
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Display is what the framebuffer gets presented on. It should abstract the
/// implementation details, so a variety of kinds of screen would work.
pub trait Display {
    /// present a packed framebuffer snapshot
    fn present(&mut self, data: &[u8]) -> io::Result<()>;
}

// store useful metadata about the terminal
struct Resolution(usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }

    fn byte_count(&self) -> usize {
        self.pixel_count() / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of every pixel whose value equals `bitplane`
    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// monochrome display in a terminal, rendered using TUI and Crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> io::Result<MonoTermDisplay> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(WIDTH, HEIGHT),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

impl Display for MonoTermDisplay {
    fn present(&mut self, data: &[u8]) -> io::Result<()> {
        // make sure we're given exactly the right amount of data to draw
        assert_eq!(
            data.len(),
            self.resolution.byte_count(),
            "MonoTermDisplay must have correct-sized data to draw"
        );

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        let resolution = &self.resolution;
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    // only lit pixels need drawing, the background is black
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(data, 1).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers the last frame
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: usize,
    pub last: Vec<u8>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for DummyDisplay {
    fn present(&mut self, data: &[u8]) -> io::Result<()> {
        self.frames += 1;
        self.last = data.to_vec();
        Ok(())
    }
}

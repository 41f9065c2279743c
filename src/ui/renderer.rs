/// Terminal display surface: double-buffered, diff-based.
///
/// How it works:
///   1. Draw calls paint the `front` buffer (array of Cell), in pixel units
///      projected onto terminal cells
///   2. `present()` compares each cell with `back` (previous frame)
///   3. Only cells that changed produce terminal commands
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Projection: a terminal column spans half a tile, a row spans a whole tile,
/// so one tile is two columns by one row. A cell belongs to a filled rect when
/// its pixel centre lies inside the rect. Outlines become thin edge glyphs on
/// the leftmost and rightmost covered columns; a row is too coarse for
/// top/bottom edges.

use std::io::{self, BufWriter, Write};
use std::ops::Range;

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, SetTitle},
};

use crate::config::DisplayConfig;
use crate::domain::color::Rgb;
use crate::error::GameError;
use super::surface::{Rect, RectStyle, Surface};

const HELP_LINE: &str = " Arrows/WASD: move   Space: till   Esc/Q: quit";

fn to_color(c: Rgb) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Background for every terminal cell outside the game screen.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };
}

// ── Projection: pixels → terminal cells ──

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Projection {
    col_px: i64,
    row_px: i64,
}

impl Projection {
    fn for_tile(tile_size: u32) -> Self {
        Projection {
            col_px: (tile_size as i64 / 2).max(1),
            row_px: (tile_size as i64).max(1),
        }
    }

    /// Columns and rows whose pixel centre lies inside `rect` (unclipped).
    fn covered(&self, rect: Rect) -> (Range<i64>, Range<i64>) {
        (
            span(rect.x as i64, rect.w as i64, self.col_px),
            span(rect.y as i64, rect.h as i64, self.row_px),
        )
    }

    /// Size of a `w × h` pixel screen in cells.
    fn cells_for(&self, w: u32, h: u32) -> (usize, usize) {
        ((w as i64 / self.col_px) as usize, (h as i64 / self.row_px) as usize)
    }
}

/// Cells `c` with `start <= c * step + step / 2 < start + len`.
fn span(start: i64, len: i64, step: i64) -> Range<i64> {
    let half = step / 2;
    ceil_div(start - half, step)..ceil_div(start + len - half, step)
}

fn ceil_div(a: i64, b: i64) -> i64 {
    -((-a).div_euclid(b))
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    /// Same content, new size: the overlapping region is kept, the rest is blank.
    fn resized(&self, w: usize, h: usize) -> FrameBuffer {
        let mut next = FrameBuffer::new(w, h);
        for y in 0..h.min(self.height) {
            for x in 0..w.min(self.width) {
                next.set(x, y, self.get(x, y));
            }
        }
        next
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn invalidate(&mut self) {
        self.cells.fill(Cell::INVALID);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (cx, ch) in (x..self.width).zip(s.chars()) {
            self.set(cx, y, Cell { ch, fg, bg });
        }
    }

    fn paint_rect(&mut self, proj: &Projection, rect: Rect, color: Color, style: RectStyle) {
        let (cols, rows) = proj.covered(rect);
        let c0 = cols.start.max(0);
        let c1 = cols.end.min(self.width as i64);
        let r0 = rows.start.max(0);
        let r1 = rows.end.min(self.height as i64);

        for r in r0..r1 {
            for c in c0..c1 {
                let (x, y) = (c as usize, r as usize);
                match style {
                    RectStyle::Filled => self.set(x, y, Cell { ch: ' ', fg: color, bg: color }),
                    RectStyle::Outline(_) => {
                        let left = c == cols.start;
                        let right = c == cols.end - 1;
                        let ch = match (left, right) {
                            (true, true) => '│',
                            (true, false) => '▏',
                            (false, true) => '▕',
                            (false, false) => continue,
                        };
                        let under = self.get(x, y);
                        self.set(x, y, Cell { ch, fg: color, bg: under.bg });
                    }
                }
            }
        }
    }
}

// ── TerminalSurface ──

pub struct TerminalSurface<W: Write = BufWriter<io::Stdout>> {
    writer: W,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    projection: Projection,
    screen: Rect,
    screen_rows: usize,
    status: String,
    /// Terminal state is modified and must be restored.
    active: bool,
    enhanced_keys: bool,
}

impl TerminalSurface {
    /// Take over the terminal. Any failure here is `DisplayInit`; whatever was
    /// already switched on is switched back off by `Drop`.
    pub fn open(display: &DisplayConfig) -> Result<Self, GameError> {
        let mut surface = TerminalSurface::new(display);
        surface.init(&display.title).map_err(GameError::DisplayInit)?;
        Ok(surface)
    }

    fn new(display: &DisplayConfig) -> Self {
        TerminalSurface::with_writer(display, BufWriter::with_capacity(16384, io::stdout()))
    }
}

impl<W: Write> TerminalSurface<W> {
    fn with_writer(display: &DisplayConfig, writer: W) -> Self {
        let projection = Projection::for_tile(display.tile_size);
        let (cols, rows) = projection.cells_for(display.screen_width, display.screen_height);
        TerminalSurface {
            writer,
            front: FrameBuffer::new(cols, rows + 2),
            back: FrameBuffer::new(cols, rows + 2),
            term_w: cols,
            term_h: rows + 2,
            projection,
            screen: Rect::new(0, 0, display.screen_width, display.screen_height),
            screen_rows: rows,
            status: String::new(),
            active: false,
            enhanced_keys: false,
        }
    }

    fn init(&mut self, title: &str) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetTitle(title),
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        // Lets the terminal tell repeats and releases apart from presses.
        if matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    /// Restore the terminal. Runs once; later calls (and `Drop`) are no-ops.
    /// Every step is attempted even if an earlier one fails; the first error
    /// is returned.
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut result = Ok(());
        let mut keep_first = |step: io::Result<()>| {
            if result.is_ok() {
                result = step;
            }
        };
        if self.enhanced_keys {
            self.enhanced_keys = false;
            keep_first(execute!(self.writer, PopKeyboardEnhancementFlags));
        }
        keep_first(execute!(self.writer, ResetColor));
        keep_first(execute!(self.writer, cursor::Show));
        keep_first(execute!(self.writer, terminal::LeaveAlternateScreen));
        keep_first(terminal::disable_raw_mode());
        result
    }

    /// Line shown under the game screen until replaced.
    pub fn set_status(&mut self, line: impl Into<String>) {
        self.status = line.into();
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front = self.front.resized(w, h);
        self.back = FrameBuffer::new(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.invalidate();
    }

    fn compose_footer(&mut self) {
        let row = self.screen_rows;
        let status = format!(" {}", self.status);
        self.front.put_str(0, row, &status, Color::White, Cell::BASE_BG);
        self.front.put_str(0, row + 1, HELP_LINE, Color::DarkGrey, Cell::BASE_BG);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(last_fg),
            SetBackgroundColor(last_bg),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn fill(&mut self, color: Rgb) {
        let screen = self.screen;
        self.front.paint_rect(&self.projection, screen, to_color(color), RectStyle::Filled);
    }

    fn draw_rect(&mut self, rect: Rect, color: Rgb, style: RectStyle) {
        self.front.paint_rect(&self.projection, rect, to_color(color), style);
    }

    fn present(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((self.term_w as u16, self.term_h as u16));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.compose_footer();
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        self.front.clear();
        Ok(())
    }
}

impl<W: Write> Drop for TerminalSurface<W> {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: u32 = 32;

    fn proj() -> Projection {
        Projection::for_tile(TILE)
    }

    fn display() -> DisplayConfig {
        DisplayConfig {
            screen_width: 640,
            screen_height: 480,
            tile_size: TILE,
            fps: 60,
            title: "test".into(),
        }
    }

    fn green() -> Color {
        to_color(Rgb::GREEN)
    }

    #[test]
    fn tile_is_two_columns_one_row() {
        let (cols, rows) = proj().covered(Rect::new(32, 224, TILE, TILE));
        assert_eq!(cols, 2..4);
        assert_eq!(rows, 7..8);
    }

    #[test]
    fn screen_is_40_by_15_cells() {
        assert_eq!(proj().cells_for(640, 480), (40, 15));
    }

    #[test]
    fn rect_thinner_than_a_cell_centre_covers_nothing() {
        let (cols, _) = proj().covered(Rect::new(0, 0, 4, TILE));
        assert!(cols.is_empty());
    }

    #[test]
    fn negative_origin_is_clipped() {
        let mut fb = FrameBuffer::new(4, 2);
        fb.paint_rect(&proj(), Rect::new(-32, 0, 64, TILE), green(), RectStyle::Filled);
        assert_eq!(fb.get(0, 0).bg, green());
        assert_eq!(fb.get(1, 0).bg, green());
        assert_eq!(fb.get(2, 0), Cell::BLANK);
    }

    #[test]
    fn outline_marks_left_and_right_edges_over_existing_color() {
        let mut fb = FrameBuffer::new(4, 1);
        let rect = Rect::new(0, 0, TILE, TILE);
        fb.paint_rect(&proj(), rect, green(), RectStyle::Filled);
        fb.paint_rect(&proj(), rect, Color::Black, RectStyle::Outline(1));

        assert_eq!(fb.get(0, 0), Cell { ch: '▏', fg: Color::Black, bg: green() });
        assert_eq!(fb.get(1, 0), Cell { ch: '▕', fg: Color::Black, bg: green() });
        assert_eq!(fb.get(2, 0), Cell::BLANK);
    }

    #[test]
    fn single_column_outline_uses_a_bar() {
        let mut fb = FrameBuffer::new(2, 1);
        fb.paint_rect(&proj(), Rect::new(0, 0, 16, TILE), Color::Black, RectStyle::Outline(1));
        assert_eq!(fb.get(0, 0).ch, '│');
    }

    #[test]
    fn clipped_outline_edge_is_not_drawn() {
        let mut fb = FrameBuffer::new(1, 1);
        fb.paint_rect(&proj(), Rect::new(0, 0, TILE, TILE), Color::Black, RectStyle::Outline(1));
        assert_eq!(fb.get(0, 0).ch, '▏');
        let mut fb = FrameBuffer::new(1, 1);
        fb.paint_rect(&proj(), Rect::new(-16, 0, TILE, TILE), Color::Black, RectStyle::Outline(1));
        assert_eq!(fb.get(0, 0).ch, '▕');
    }

    #[test]
    fn resized_keeps_overlap() {
        let mut fb = FrameBuffer::new(3, 3);
        fb.put_str(0, 0, "abc", Color::White, Cell::BASE_BG);
        let small = fb.resized(2, 1);
        assert_eq!(small.get(1, 0).ch, 'b');
        let big = fb.resized(5, 5);
        assert_eq!(big.get(2, 0).ch, 'c');
        assert_eq!(big.get(4, 4), Cell::BLANK);
    }

    #[test]
    fn surface_draw_calls_land_in_front_buffer() {
        let mut s = TerminalSurface::with_writer(&display(), Vec::new());
        s.fill(Rgb::BLACK);
        s.draw_rect(Rect::new(320, 224, TILE, TILE), Rgb::BLUE, RectStyle::Filled);

        assert_eq!(s.front.get(0, 0).bg, to_color(Rgb::BLACK));
        assert_eq!(s.front.get(39, 14).bg, to_color(Rgb::BLACK));
        assert_eq!(s.front.get(20, 7).bg, to_color(Rgb::BLUE));
        assert_eq!(s.front.get(21, 7).bg, to_color(Rgb::BLUE));
        assert_eq!(s.front.get(22, 7).bg, to_color(Rgb::BLACK));
        // footer rows stay outside the screen area
        assert_eq!(s.front.get(0, 15), Cell::BLANK);
    }

    #[test]
    fn footer_shows_status_under_the_screen() {
        let mut s = TerminalSurface::with_writer(&display(), Vec::new());
        s.set_status("Player position: (10, 3)");
        s.compose_footer();
        let row: String = (0..25).map(|x| s.front.get(x, 15).ch).collect();
        assert_eq!(row, " Player position: (10, 3)");
    }

    #[test]
    fn cleanup_without_init_is_a_no_op() {
        let mut s = TerminalSurface::with_writer(&display(), Vec::new());
        assert!(s.cleanup().is_ok());
        assert!(s.writer.is_empty());
    }

    /// Fails the first `failures` writes, records the rest.
    struct FlakyWriter {
        failures: usize,
        written: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn cleanup_keeps_restoring_after_a_failed_step() {
        let writer = FlakyWriter { failures: 1, written: Vec::new() };
        let mut s = TerminalSurface::with_writer(&display(), writer);
        s.active = true;
        s.enhanced_keys = true;

        let err = s.cleanup().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        let out = String::from_utf8_lossy(&s.writer.written).into_owned();
        assert!(out.contains("\x1b[?25h"), "cursor not shown: {out:?}");
        assert!(out.contains("\x1b[?1049l"), "alternate screen not left: {out:?}");

        // Once restored, a second call does nothing.
        let before = s.writer.written.len();
        assert!(s.cleanup().is_ok());
        assert_eq!(s.writer.written.len(), before);
    }
}

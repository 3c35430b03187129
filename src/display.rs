//! Drawing surfaces. The map only ever talks to a [`Surface`]; the terminal
//! renderer and the headless recorder are the two implementations.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::components::Direction;
use crate::objects::FOOD_TILE;

const CELL_W: usize = 2;
const NOTICE_ROWS: usize = 3;
const PLAYER_TILE: u16 = 0;

pub trait Surface {
    /// Resize to a `width` x `height` cell grid and blank it.
    fn resize(&mut self, width: i32, height: i32);
    fn draw_tile(&mut self, x: i32, y: i32, tile: u16, frame: u16, clear_first: bool);
    fn draw_block(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color);
    /// Text centred on column `x`, baseline on row `y`.
    fn draw_text(&mut self, x: i32, y: i32, size: i32, text: &str);
    fn clear_tile(&mut self, x: i32, y: i32);
    fn clear(&mut self);
    fn show_notice(&mut self, text: &str);
    fn hide_notice(&mut self);
    fn notice_visible(&self) -> bool;
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct Cell {
    text: &'static str,
    color: Color,
}

const BLANK: Cell = Cell {
    text: "  ",
    color: Color::Reset,
};

fn ghost_color(tile: u16) -> Color {
    match tile {
        1 => Color::Red,
        2 => Color::Magenta,
        3 => Color::Cyan,
        4 => Color::DarkYellow,
        _ => Color::White,
    }
}

fn tile_cell(tile: u16, frame: u16) -> Cell {
    let mouth_open = frame % 2 == 0;
    match tile {
        PLAYER_TILE => {
            let text = if !mouth_open {
                "\u{25CF}"
            } else {
                match Direction::from_code(frame - frame % 2) {
                    Some(Direction::East) | None => "\u{15E7}",
                    Some(Direction::West) => "\u{15E4}",
                    Some(Direction::North) => "\u{15E2}",
                    Some(Direction::South) => "\u{15E3}",
                }
            };
            Cell {
                text,
                color: Color::Yellow,
            }
        }
        1..=4 => Cell {
            text: if mouth_open { "\u{15E3}" } else { "\u{15E9}" },
            color: ghost_color(tile),
        },
        FOOD_TILE if frame == 1 => Cell {
            text: "\u{1F370}",
            color: Color::White,
        },
        FOOD_TILE => Cell {
            text: "\u{B7}",
            color: Color::White,
        },
        _ => Cell {
            text: "??",
            color: Color::DarkGrey,
        },
    }
}

/// Crossterm renderer. Draw calls land in a back buffer; [`present`] writes
/// only the cells that changed since the previous frame.
///
/// [`present`]: TermDisplay::present
pub struct TermDisplay<W: Write> {
    out: W,
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    last: Vec<Cell>,
    texts: Vec<(i32, i32, i32, String)>,
    notice: Option<String>,
    last_notice: Option<String>,
    title: String,
    last_title: String,
    term_size: Option<(u16, u16)>,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl<W: Write> TermDisplay<W> {
    pub fn new(out: W) -> Self {
        TermDisplay {
            out,
            width: 0,
            height: 0,
            cells: Vec::new(),
            last: Vec::new(),
            texts: Vec::new(),
            notice: None,
            last_notice: None,
            title: String::new(),
            last_title: String::new(),
            term_size: None,
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn set_terminal_size(&mut self, size: (u16, u16)) {
        self.term_size = Some(size);
        self.needs_full = true;
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    fn put(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx] = cell;
        }
    }

    pub fn present(&mut self) -> io::Result<()> {
        let needed_w = (self.width * CELL_W) as u16;
        let needed_h = (self.height + NOTICE_ROWS + 1) as u16;

        self.out.queue(MoveTo(0, 0))?;

        if let Some((term_w, term_h)) = self.term_size {
            if term_w < needed_w || term_h < needed_h {
                self.out.queue(Clear(ClearType::All))?;
                let msg = format!(
                    "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                    needed_w, needed_h, term_w, term_h
                );
                self.out.queue(Print(msg))?;
                self.out.flush()?;
                self.needs_full = true;
                return Ok(());
            }
            let origin_x = (term_w - needed_w) / 2;
            let origin_y = (term_h - needed_h) / 2 + 1;
            if origin_x != self.origin_x || origin_y != self.origin_y {
                self.origin_x = origin_x;
                self.origin_y = origin_y;
                self.needs_full = true;
            }
        }

        if self.needs_full {
            self.out.queue(Clear(ClearType::All))?;
        }

        if self.needs_full || self.title != self.last_title {
            self.out
                .queue(MoveTo(self.origin_x, self.origin_y.saturating_sub(1)))?;
            self.out.queue(SetForegroundColor(Color::White))?;
            self.out.queue(Clear(ClearType::CurrentLine))?;
            self.out.queue(Print(&self.title))?;
            self.out.queue(ResetColor)?;
            self.last_title = self.title.clone();
        }

        for idx in 0..self.cells.len() {
            let cell = self.cells[idx];
            if self.needs_full || cell != self.last[idx] {
                self.last[idx] = cell;
                self.draw_cell(idx % self.width, idx / self.width, cell)?;
            }
        }

        for i in 0..self.texts.len() {
            let (x, y, size, text) = self.texts[i].clone();
            let half = (UnicodeWidthStr::width(text.as_str()) / 2) as i32;
            let col = self.origin_x as i32 + x * CELL_W as i32 - half;
            let row = self.origin_y as i32 + y - size;
            if col < 0 || row < 0 {
                continue;
            }
            self.out.queue(MoveTo(col as u16, row as u16))?;
            self.out.queue(SetForegroundColor(Color::White))?;
            self.out.queue(Print(&text))?;
            self.out.queue(ResetColor)?;
        }

        if self.needs_full || self.notice != self.last_notice {
            let top = self.origin_y + self.height as u16 + 1;
            let lines: Vec<&str> = self
                .notice
                .as_deref()
                .map(|n| n.lines().collect())
                .unwrap_or_default();
            for row in 0..NOTICE_ROWS {
                self.out.queue(MoveTo(0, top + row as u16))?;
                self.out.queue(Clear(ClearType::CurrentLine))?;
                if let Some(line) = lines.get(row) {
                    let w = UnicodeWidthStr::width(*line) as u16;
                    let col = (self.origin_x + needed_w / 2).saturating_sub(w / 2);
                    self.out.queue(MoveTo(col, top + row as u16))?;
                    self.out.queue(SetForegroundColor(Color::White))?;
                    self.out.queue(Print(*line))?;
                    self.out.queue(ResetColor)?;
                }
            }
            self.last_notice = self.notice.clone();
        }

        self.needs_full = false;
        self.out.flush()
    }

    fn draw_cell(&mut self, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        self.out.queue(MoveTo(x_pos, y_pos))?;
        self.out.queue(SetForegroundColor(cell.color))?;
        self.out.queue(Print(cell.text))?;
        let w = UnicodeWidthStr::width(cell.text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                self.out.queue(Print(' '))?;
            }
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }
}

impl<W: Write> Surface for TermDisplay<W> {
    fn resize(&mut self, width: i32, height: i32) {
        self.width = width.max(0) as usize;
        self.height = height.max(0) as usize;
        self.cells = vec![BLANK; self.width * self.height];
        self.last = self.cells.clone();
        self.texts.clear();
        self.needs_full = true;
    }

    fn draw_tile(&mut self, x: i32, y: i32, tile: u16, frame: u16, _clear_first: bool) {
        // A cell holds one glyph, so drawing always replaces what was there.
        self.put(x, y, tile_cell(tile, frame));
    }

    fn draw_block(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        for dy in 0..h {
            for dx in 0..w {
                let text = if color == Color::Black || color == Color::Reset {
                    "  "
                } else {
                    "\u{2588}\u{2588}"
                };
                self.put(x + dx, y + dy, Cell { text, color });
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, size: i32, text: &str) {
        match self
            .texts
            .iter_mut()
            .find(|(tx, ty, _, _)| *tx == x && *ty == y)
        {
            Some(slot) => {
                slot.2 = size;
                slot.3 = text.to_string();
            }
            None => self.texts.push((x, y, size, text.to_string())),
        }
    }

    fn clear_tile(&mut self, x: i32, y: i32) {
        self.put(x, y, BLANK);
    }

    fn clear(&mut self) {
        self.cells.fill(BLANK);
        self.texts.clear();
        self.needs_full = true;
    }

    fn show_notice(&mut self, text: &str) {
        self.notice = Some(text.to_string());
    }

    fn hide_notice(&mut self) {
        self.notice = None;
    }

    fn notice_visible(&self) -> bool {
        self.notice.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Tile {
        x: i32,
        y: i32,
        tile: u16,
        frame: u16,
    },
    Block {
        x: i32,
        y: i32,
        color: Color,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
    },
    ClearTile {
        x: i32,
        y: i32,
    },
    Clear,
}

/// Headless surface that keeps every draw call, for running the game
/// without a terminal.
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<DrawCall>,
    pub notice: Option<String>,
    pub notices_shown: usize,
    pub size: (i32, i32),
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Surface for Recorder {
    fn resize(&mut self, width: i32, height: i32) {
        self.size = (width, height);
        self.calls.clear();
    }

    fn draw_tile(&mut self, x: i32, y: i32, tile: u16, frame: u16, _clear_first: bool) {
        self.calls.push(DrawCall::Tile { x, y, tile, frame });
    }

    fn draw_block(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        for dy in 0..h {
            for dx in 0..w {
                self.calls.push(DrawCall::Block {
                    x: x + dx,
                    y: y + dy,
                    color,
                });
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, _size: i32, text: &str) {
        self.calls.push(DrawCall::Text {
            x,
            y,
            text: text.to_string(),
        });
    }

    fn clear_tile(&mut self, x: i32, y: i32) {
        self.calls.push(DrawCall::ClearTile { x, y });
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn show_notice(&mut self, text: &str) {
        self.notices_shown += 1;
        self.notice = Some(text.to_string());
    }

    fn hide_notice(&mut self) {
        self.notice = None;
    }

    fn notice_visible(&self) -> bool {
        self.notice.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(display: &TermDisplay<Vec<u8>>) -> String {
        String::from_utf8_lossy(display.writer()).into_owned()
    }

    #[test]
    fn only_changed_cells_are_written() {
        let mut display = TermDisplay::new(Vec::new());
        display.resize(4, 2);
        display.draw_tile(1, 1, FOOD_TILE, 1, true);
        display.present().unwrap();
        assert!(output(&display).contains("\u{1F370}"));

        display.out.clear();
        display.present().unwrap();
        assert!(!output(&display).contains("\u{1F370}"));

        display.clear_tile(1, 1);
        display.draw_block(0, 0, 1, 1, Color::Grey);
        display.present().unwrap();
        assert!(output(&display).contains("\u{2588}\u{2588}"));
    }

    #[test]
    fn out_of_range_draws_are_dropped() {
        let mut display = TermDisplay::new(Vec::new());
        display.resize(2, 2);
        display.draw_tile(-1, 0, 0, 0, true);
        display.draw_tile(2, 0, 0, 0, true);
        assert!(display.cells.iter().all(|c| *c == BLANK));
    }

    #[test]
    fn notice_shows_below_the_maze() {
        let mut display = TermDisplay::new(Vec::new());
        display.resize(10, 3);
        display.show_notice("Start the game by moving.\nUse arrows to move around.");
        assert!(display.notice_visible());
        display.present().unwrap();
        let out = output(&display);
        assert!(out.contains("Start the game by moving."));
        assert!(out.contains("Use arrows to move around."));
        display.hide_notice();
        assert!(!display.notice_visible());
    }

    #[test]
    fn small_terminal_gets_a_warning_instead_of_the_maze() {
        let mut display = TermDisplay::new(Vec::new());
        display.resize(40, 20);
        display.set_terminal_size((20, 10));
        display.draw_tile(0, 0, FOOD_TILE, 1, true);
        display.present().unwrap();
        let out = output(&display);
        assert!(out.contains("Terminal too small"));
        assert!(!out.contains("\u{1F370}"));
    }

    #[test]
    fn player_glyph_follows_heading() {
        assert_eq!(tile_cell(PLAYER_TILE, Direction::West.code()).text, "\u{15E4}");
        assert_eq!(tile_cell(PLAYER_TILE, Direction::West.code() + 1).text, "\u{25CF}");
        assert_eq!(tile_cell(2, 0).color, Color::Magenta);
    }
}

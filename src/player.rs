use crate::components::{Direction, Pos};
use crate::map::{Map, Step};
use crate::scheduler::Turn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pos: Pos,
    tile: u16,
    score: u32,
    facing: Direction,
    animation: u16,
    killed: bool,
    ready: bool,
}

impl Player {
    pub fn new(pos: Pos, tile: u16) -> Self {
        Player {
            pos,
            tile,
            score: 0,
            facing: Direction::East,
            animation: 0,
            killed: false,
            ready: false,
        }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn tile(&self) -> u16 {
        self.tile
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Scheduler turn: open the window for one directional input.
    pub fn act(&mut self) -> Turn {
        if !self.killed {
            self.ready = true;
        }
        Turn::Done
    }

    /// Stop listening for input until the next turn.
    pub fn detach(&mut self) {
        self.ready = false;
    }

    pub fn nom(&mut self, value: u32) {
        self.score += value;
    }

    pub fn killed_by(&mut self, cause: &str) {
        log::info!("player caught by {cause} with {} points", self.score);
        self.killed = true;
        self.ready = false;
    }

    pub fn frame(&mut self, flip: bool) -> u16 {
        let frame = self.animation;
        if flip {
            self.animation = 1 - self.animation;
        }
        self.facing.code() + frame
    }
}

impl Map {
    pub(crate) fn nom(&mut self, cell: Pos, value: u32) {
        if let Some(player) = self.player.as_mut() {
            player.nom(value);
        }
        self.destroy_object(cell.x, cell.y);
    }

    /// Handle one directional input. `None` means the input was ignored:
    /// no player, not its turn, or a wall in the way.
    pub fn move_player(&mut self, dir: Direction) -> Option<Step> {
        let player = self.player.as_ref()?;
        if !player.ready {
            return None;
        }
        let target = player.pos.step(dir);
        if !self.can_move_to(target.x, target.y) {
            return None;
        }
        let step = self.player_move_to(target.x, target.y);
        let player = self.player.as_mut()?;
        if step == Step::Clear {
            player.pos = target;
            player.facing = dir;
            player.ready = false;
        }
        Some(step)
    }
}

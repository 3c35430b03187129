//! The grid: static objects, dirty-cell tracking, dynamics and the player.

use std::collections::HashMap;

use rand::Rng;

use crate::components::Pos;
use crate::display::Surface;
use crate::error::{GameError, GameResult};
use crate::ghost::DynamicActor;
use crate::level::Level;
use crate::objects::{Collision, ObjectDefinition, ObjectType};
use crate::player::Player;

pub const IDLE_NOTICE: &str = "Start the game by moving.\nUse arrows to move around.";

/// Actors created by the map that still have to be handed to the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recruit {
    Player,
}

/// Result of the player stepping onto a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Clear,
    Killed { by: String },
}

/// Result of the map's own scheduler turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapTurn {
    /// Nobody has moved yet; the simulation is waiting.
    Idle,
    Advanced,
    Victory,
    Caught { by: String },
}

pub enum Occupant<'a> {
    Static(&'a ObjectDefinition),
    Dynamic(&'a DynamicActor),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreBoard {
    pub x: i32,
    pub y: i32,
    pub size: i32,
}

pub struct Map {
    width: i32,
    height: i32,
    cells: Vec<Option<ObjectType>>,
    dirty: Vec<bool>,
    dirty_list: Vec<usize>,
    names: HashMap<String, ObjectType>,
    defs: Vec<ObjectDefinition>,
    counts: Vec<usize>,
    pub(crate) dynamics: Vec<DynamicActor>,
    pub(crate) player: Option<Player>,
    started: bool,
    score_board: Option<ScoreBoard>,
    recruits: Vec<Recruit>,
}

impl Map {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let area = (width * height) as usize;
        Map {
            width,
            height,
            cells: vec![None; area],
            dirty: vec![false; area],
            dirty_list: Vec::new(),
            names: HashMap::new(),
            defs: Vec::new(),
            counts: Vec::new(),
            dynamics: Vec::new(),
            player: None,
            started: false,
            score_board: None,
            recruits: Vec::new(),
        }
    }

    /// Forget everything placed or defined, keeping the bounds.
    pub fn clear(&mut self) {
        self.cells.fill(None);
        self.dirty.fill(false);
        self.dirty_list.clear();
        self.names.clear();
        self.defs.clear();
        self.counts.clear();
        self.dynamics.clear();
        self.player = None;
        self.started = false;
        self.score_board = None;
        self.recruits.clear();
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub(crate) fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    fn pos_of(&self, idx: usize) -> Pos {
        let w = self.width as usize;
        Pos::new((idx % w) as i32, (idx / w) as i32)
    }

    pub(crate) fn mark_dirty(&mut self, pos: Pos) {
        if let Some(idx) = self.index(pos.x, pos.y) {
            if !self.dirty[idx] {
                self.dirty[idx] = true;
                self.dirty_list.push(idx);
            }
        }
    }

    pub fn is_dirty(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|idx| self.dirty[idx])
    }

    pub fn dirty_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.dirty_list.iter().map(|&idx| self.pos_of(idx))
    }

    pub fn score_board(&mut self, x: i32, y: i32, size: i32) {
        self.score_board = Some(ScoreBoard { x, y, size });
    }

    pub fn define_object(&mut self, name: &str, def: ObjectDefinition) -> GameResult<ObjectType> {
        if self.names.contains_key(name) {
            return Err(GameError::DuplicateDefinition(name.to_string()));
        }
        let ty = ObjectType(self.defs.len() as u16);
        self.names.insert(name.to_string(), ty);
        self.defs.push(def);
        self.counts.push(0);
        Ok(ty)
    }

    pub fn object_type(&self, name: &str) -> Option<ObjectType> {
        self.names.get(name).copied()
    }

    pub fn definition(&self, ty: ObjectType) -> &ObjectDefinition {
        &self.defs[ty.index()]
    }

    /// How many static objects of the named type are on the grid.
    pub fn count(&self, name: &str) -> Option<usize> {
        self.object_type(name).map(|ty| self.counts[ty.index()])
    }

    fn lookup(&self, name: &str) -> GameResult<ObjectType> {
        self.object_type(name)
            .ok_or_else(|| GameError::UnknownType(name.to_string()))
    }

    pub fn place_object(&mut self, x: i32, y: i32, name: &str) -> GameResult<()> {
        let ty = self.lookup(name)?;
        if self.player_pos() == Some(Pos::new(x, y)) {
            return Err(GameError::CellOccupied {
                x,
                y,
                by_player: true,
            });
        }
        let idx = self.index(x, y).ok_or(GameError::OutOfBounds { x, y })?;
        if self.cells[idx].is_some() {
            return Err(GameError::CellOccupied {
                x,
                y,
                by_player: false,
            });
        }
        self.cells[idx] = Some(ty);
        self.counts[ty.index()] += 1;
        self.mark_dirty(Pos::new(x, y));
        Ok(())
    }

    /// Remove the static object on a cell. Returns whether there was one.
    pub fn destroy_object(&mut self, x: i32, y: i32) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        let Some(ty) = self.cells[idx].take() else {
            return false;
        };
        self.counts[ty.index()] -= 1;
        self.mark_dirty(Pos::new(x, y));
        true
    }

    pub fn add_dynamic(&mut self, x: i32, y: i32, name: &str) -> GameResult<()> {
        let ty = self.lookup(name)?;
        if self.index(x, y).is_none() {
            return Err(GameError::OutOfBounds { x, y });
        }
        self.dynamics.push(DynamicActor::new(ty, Pos::new(x, y)));
        Ok(())
    }

    pub fn place_player(&mut self, x: i32, y: i32, tile: u16) -> GameResult<()> {
        if self.player.is_some() {
            return Err(GameError::PlayerAlreadyPlaced);
        }
        if self.index(x, y).is_none() {
            return Err(GameError::OutOfBounds { x, y });
        }
        self.player = Some(Player::new(Pos::new(x, y), tile));
        self.recruits.push(Recruit::Player);
        Ok(())
    }

    pub fn take_recruits(&mut self) -> Vec<Recruit> {
        std::mem::take(&mut self.recruits)
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }

    pub fn player_pos(&self) -> Option<Pos> {
        self.player.as_ref().map(|p| p.pos())
    }

    pub fn dynamics(&self) -> &[DynamicActor] {
        &self.dynamics
    }

    /// Static passability only; dynamics are checked separately with
    /// [`Map::check_for_dynamic`].
    pub fn can_move_to(&self, x: i32, y: i32) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        match self.cells[idx] {
            None => true,
            Some(ty) => !self.defs[ty.index()].impassable,
        }
    }

    pub fn check_for_dynamic(&self, x: i32, y: i32) -> bool {
        self.dynamic_at(Pos::new(x, y)).is_some()
    }

    fn dynamic_at(&self, pos: Pos) -> Option<usize> {
        self.dynamics.iter().position(|d| d.pos() == pos)
    }

    /// Static object first, then any dynamic standing there. The player is
    /// never reported.
    pub fn get_object_on(&self, x: i32, y: i32) -> Option<Occupant<'_>> {
        if let Some(ty) = self.index(x, y).and_then(|idx| self.cells[idx]) {
            return Some(Occupant::Static(&self.defs[ty.index()]));
        }
        self.dynamic_at(Pos::new(x, y))
            .map(|i| Occupant::Dynamic(&self.dynamics[i]))
    }

    /// Side effects of the player entering `(x, y)`. The caller commits the
    /// new position only on [`Step::Clear`].
    pub fn player_move_to(&mut self, x: i32, y: i32) -> Step {
        let target = Pos::new(x, y);
        if let Some(from) = self.player_pos() {
            self.mark_dirty(from);
        }
        self.mark_dirty(target);

        if let Some(i) = self.dynamic_at(target) {
            let collision = self.defs[self.dynamics[i].object_type().index()]
                .behavior
                .on_collision();
            return self.collide(target, collision);
        }

        if let Some(ty) = self.index(x, y).and_then(|idx| self.cells[idx]) {
            let collision = self.defs[ty.index()].behavior.on_collision();
            if let Step::Killed { by } = self.collide(target, collision) {
                return Step::Killed { by };
            }
        }

        self.started = true;
        Step::Clear
    }

    pub(crate) fn collide(&mut self, cell: Pos, collision: Collision) -> Step {
        match collision {
            Collision::Nothing => Step::Clear,
            Collision::Eat(value) => {
                self.nom(cell, value);
                Step::Clear
            }
            Collision::Kill(by) => {
                if let Some(player) = self.player.as_mut() {
                    player.killed_by(&by);
                }
                Step::Killed { by }
            }
        }
    }

    /// Redraw the dirty cells, then the player and every dynamic on top.
    pub fn draw(&mut self, surface: &mut dyn Surface, flip: bool) {
        let mut list = std::mem::take(&mut self.dirty_list);
        for &idx in &list {
            self.dirty[idx] = false;
            let pos = self.pos_of(idx);
            let Some(ty) = self.cells[idx] else {
                surface.clear_tile(pos.x, pos.y);
                continue;
            };
            let def = &self.defs[ty.index()];
            if let Some(tile) = def.tile {
                surface.draw_tile(pos.x, pos.y, tile, def.frame.unwrap_or(0), true);
            } else if let Some(color) = def.color {
                surface.draw_block(pos.x, pos.y, 1, 1, color);
            }
        }
        list.clear();
        self.dirty_list = list;

        if let Some(player) = self.player.as_mut() {
            let pos = player.pos();
            let frame = player.frame(flip);
            surface.draw_tile(pos.x, pos.y, player.tile(), frame, true);
        }

        for dynamic in &mut self.dynamics {
            let tile = self.defs[dynamic.object_type().index()].tile.unwrap_or(0);
            let pos = dynamic.pos();
            let frame = dynamic.frame(flip);
            surface.draw_tile(pos.x, pos.y, tile, frame, true);
        }

        if let (Some(board), Some(player)) = (self.score_board, self.player.as_ref()) {
            surface.draw_text(board.x, board.y, board.size, "Score:");
            surface.draw_text(
                board.x,
                board.y + board.size,
                board.size,
                &player.score().to_string(),
            );
        }
    }

    /// The map's scheduler turn: hold still until the first player move,
    /// then check for victory and advance every dynamic.
    pub fn act<R: Rng + ?Sized>(
        &mut self,
        surface: &mut dyn Surface,
        level: &dyn Level,
        rng: &mut R,
    ) -> MapTurn {
        if !self.started {
            if !surface.notice_visible() {
                surface.show_notice(IDLE_NOTICE);
            }
            return MapTurn::Idle;
        }
        if surface.notice_visible() {
            surface.hide_notice();
        }
        if level.check_victory(self) {
            return MapTurn::Victory;
        }
        match self.advance_dynamics(rng) {
            Some(by) => MapTurn::Caught { by },
            None => MapTurn::Advanced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Direction;
    use crate::display::{DrawCall, Recorder};
    use crate::objects::{FOOD_VALUE, WALL_COLOR};
    use proptest::prelude::*;

    fn map() -> Map {
        let mut map = Map::new(8, 6);
        map.define_object("block", ObjectDefinition::wall()).unwrap();
        map.define_object("food", ObjectDefinition::food(FOOD_VALUE))
            .unwrap();
        map.define_object("blinky", ObjectDefinition::ghost(1, "Blinky"))
            .unwrap();
        map
    }

    #[test]
    fn redefinition_fails() {
        let mut map = map();
        assert_eq!(
            map.define_object("food", ObjectDefinition::food(5)),
            Err(GameError::DuplicateDefinition("food".to_string()))
        );
        let food = map.object_type("food").unwrap();
        assert_eq!(
            map.definition(food).behavior.on_collision(),
            Collision::Eat(10)
        );
    }

    #[test]
    fn unknown_types_are_rejected() {
        let mut map = map();
        assert_eq!(
            map.place_object(1, 1, "cherry"),
            Err(GameError::UnknownType("cherry".to_string()))
        );
        assert_eq!(
            map.add_dynamic(1, 1, "sue"),
            Err(GameError::UnknownType("sue".to_string()))
        );
    }

    #[test]
    fn placing_on_an_occupied_cell_leaves_the_map_alone() {
        let mut map = map();
        map.place_object(2, 2, "block").unwrap();
        map.draw(&mut Recorder::new(), false);
        assert!(!map.is_dirty(2, 2));

        let err = map.place_object(2, 2, "food").unwrap_err();
        assert_eq!(
            err,
            GameError::CellOccupied {
                x: 2,
                y: 2,
                by_player: false
            }
        );
        assert!(!map.is_dirty(2, 2));
        assert_eq!(map.count("food"), Some(0));
        assert_eq!(map.count("block"), Some(1));
    }

    #[test]
    fn player_cell_is_never_a_placement_target() {
        let mut map = map();
        map.place_player(3, 3, 0).unwrap();
        assert_eq!(
            map.place_object(3, 3, "food"),
            Err(GameError::CellOccupied {
                x: 3,
                y: 3,
                by_player: true
            })
        );
        assert_eq!(map.place_player(4, 4, 0), Err(GameError::PlayerAlreadyPlaced));
        assert_eq!(map.take_recruits(), vec![Recruit::Player]);
        assert!(map.take_recruits().is_empty());
    }

    #[test]
    fn destroy_is_a_no_op_on_empty_cells() {
        let mut map = map();
        map.place_object(1, 1, "food").unwrap();
        assert_eq!(map.count("food"), Some(1));
        assert!(map.destroy_object(1, 1));
        assert_eq!(map.count("food"), Some(0));
        assert!(!map.destroy_object(1, 1));
        assert!(!map.destroy_object(-4, 1));
        assert_eq!(map.count("food"), Some(0));
    }

    #[test]
    fn walls_block_food_does_not() {
        let mut map = map();
        map.place_object(1, 1, "block").unwrap();
        map.place_object(2, 1, "food").unwrap();
        assert!(!map.can_move_to(1, 1));
        assert!(map.can_move_to(2, 1));
        assert!(map.can_move_to(3, 1));
    }

    #[test]
    fn dynamics_do_not_affect_passability() {
        let mut map = map();
        map.add_dynamic(4, 4, "blinky").unwrap();
        assert!(map.can_move_to(4, 4));
        assert!(map.check_for_dynamic(4, 4));
        assert!(!map.check_for_dynamic(4, 3));
    }

    #[test]
    fn object_lookup_prefers_statics() {
        let mut map = map();
        map.place_object(1, 1, "food").unwrap();
        map.add_dynamic(1, 1, "blinky").unwrap();
        map.add_dynamic(2, 1, "blinky").unwrap();
        assert!(matches!(
            map.get_object_on(1, 1),
            Some(Occupant::Static(def)) if def.tile == Some(5)
        ));
        assert!(matches!(
            map.get_object_on(2, 1),
            Some(Occupant::Dynamic(d)) if d.pos() == Pos::new(2, 1)
        ));
        assert!(map.get_object_on(3, 1).is_none());
        assert!(map.get_object_on(30, 1).is_none());
    }

    #[test]
    fn eating_food_scores_and_empties_the_cell() {
        let mut map = map();
        map.place_player(2, 2, 0).unwrap();
        map.place_object(3, 2, "food").unwrap();
        map.draw(&mut Recorder::new(), false);

        assert_eq!(map.move_player(Direction::East), None);
        map.player_mut().unwrap().act();
        assert_eq!(map.move_player(Direction::East), Some(Step::Clear));

        let player = map.player().unwrap();
        assert_eq!(player.score(), 10);
        assert_eq!(player.pos(), Pos::new(3, 2));
        assert!(map.get_object_on(3, 2).is_none());
        assert!(map.is_dirty(2, 2));
        assert!(map.is_dirty(3, 2));
        assert!(!map.destroy_object(3, 2));
        assert!(map.is_started());
    }

    #[test]
    fn walking_into_a_ghost_is_fatal_and_not_committed() {
        let mut map = map();
        map.place_player(2, 2, 0).unwrap();
        map.add_dynamic(2, 3, "blinky").unwrap();
        map.player_mut().unwrap().act();
        assert_eq!(
            map.move_player(Direction::South),
            Some(Step::Killed {
                by: "Blinky the ghost".to_string()
            })
        );
        let player = map.player().unwrap();
        assert!(player.is_killed());
        assert_eq!(player.pos(), Pos::new(2, 2));
    }

    #[test]
    fn draw_only_touches_dirty_cells_then_actors() {
        let mut map = map();
        map.place_object(0, 0, "block").unwrap();
        map.place_object(1, 0, "food").unwrap();
        map.place_player(4, 4, 0).unwrap();
        map.add_dynamic(5, 5, "blinky").unwrap();
        map.score_board(6, 1, 1);

        let mut rec = Recorder::new();
        map.draw(&mut rec, false);
        assert_eq!(
            rec.take(),
            vec![
                DrawCall::Block {
                    x: 0,
                    y: 0,
                    color: WALL_COLOR
                },
                DrawCall::Tile {
                    x: 1,
                    y: 0,
                    tile: 5,
                    frame: 1
                },
                DrawCall::Tile {
                    x: 4,
                    y: 4,
                    tile: 0,
                    frame: 0
                },
                DrawCall::Tile {
                    x: 5,
                    y: 5,
                    tile: 1,
                    frame: 2
                },
                DrawCall::Text {
                    x: 6,
                    y: 1,
                    text: "Score:".to_string()
                },
                DrawCall::Text {
                    x: 6,
                    y: 2,
                    text: "0".to_string()
                },
            ]
        );
        assert_eq!(map.dirty_cells().count(), 0);

        map.destroy_object(1, 0);
        map.draw(&mut rec, false);
        let calls = rec.take();
        assert_eq!(calls[0], DrawCall::ClearTile { x: 1, y: 0 });
        assert!(!calls.contains(&DrawCall::Block {
            x: 0,
            y: 0,
            color: WALL_COLOR
        }));
    }

    #[test]
    fn flip_animates_actors() {
        let mut map = map();
        map.place_player(1, 1, 0).unwrap();
        let mut rec = Recorder::new();
        map.draw(&mut rec, true);
        map.draw(&mut rec, false);
        let frames: Vec<u16> = rec
            .take()
            .into_iter()
            .filter_map(|c| match c {
                DrawCall::Tile { tile: 0, frame, .. } => Some(frame),
                _ => None,
            })
            .collect();
        assert_eq!(frames, vec![0, 1]);
    }

    proptest! {
        #[test]
        fn nothing_outside_the_bounds_is_walkable(x in -50i32..50, y in -50i32..50) {
            let mut map = map();
            for yy in 0..map.height() {
                for xx in 0..map.width() {
                    if (xx + yy) % 3 == 0 {
                        map.place_object(xx, yy, "food").unwrap();
                    }
                }
            }
            let inside = (0..8).contains(&x) && (0..6).contains(&y);
            if !inside {
                prop_assert!(!map.can_move_to(x, y));
            } else {
                prop_assert!(map.can_move_to(x, y));
            }
        }
    }
}

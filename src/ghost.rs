use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Direction, Pos};
use crate::map::{Map, Step};
use crate::objects::ObjectType;

/// Order in which a ghost looks around before shuffling.
const BRAIN: [Direction; 4] = [
    Direction::West,
    Direction::East,
    Direction::South,
    Direction::North,
];

/// Heading and animation state of a wandering ghost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostBrain {
    heading: Direction,
    animation: u16,
}

impl Default for GhostBrain {
    fn default() -> Self {
        GhostBrain {
            heading: BRAIN[0],
            animation: 0,
        }
    }
}

impl GhostBrain {
    pub fn with_heading(heading: Direction) -> Self {
        GhostBrain {
            heading,
            animation: 0,
        }
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    /// Pick where to go next from the open directions. Junctions with three
    /// or more exits get a random new heading, corridors keep the current one
    /// while it stays open.
    pub fn choose<R: Rng + ?Sized>(
        &mut self,
        open: &mut [Direction],
        rng: &mut R,
    ) -> Option<Direction> {
        open.shuffle(rng);
        if open.len() >= 3 {
            self.heading = open[0];
            Some(open[0])
        } else if open.contains(&self.heading) {
            Some(self.heading)
        } else if let Some(&first) = open.first() {
            self.heading = first;
            Some(first)
        } else {
            None
        }
    }

    pub fn frame(&mut self, flip: bool) -> u16 {
        let frame = self.animation;
        if flip {
            self.animation = 1 - self.animation;
        }
        self.heading.code() + frame
    }
}

/// A grid-resident actor that moves on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicActor {
    ty: ObjectType,
    pos: Pos,
    brain: GhostBrain,
}

impl DynamicActor {
    pub fn new(ty: ObjectType, pos: Pos) -> Self {
        DynamicActor {
            ty,
            pos,
            brain: GhostBrain::default(),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.ty
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn brain(&self) -> &GhostBrain {
        &self.brain
    }

    pub fn frame(&mut self, flip: bool) -> u16 {
        self.brain.frame(flip)
    }
}

impl Map {
    fn dynamic_can_enter(&self, pos: Pos) -> bool {
        self.can_move_to(pos.x, pos.y) && !self.check_for_dynamic(pos.x, pos.y)
    }

    /// Directions the dynamic at `index` could step into right now.
    pub fn open_directions(&self, index: usize) -> Vec<Direction> {
        let from = self.dynamics[index].pos();
        BRAIN
            .iter()
            .copied()
            .filter(|dir| self.dynamic_can_enter(from.step(*dir)))
            .collect()
    }

    /// One turn for the dynamic at `index`. Returns the cause of death when
    /// it walked into the player.
    pub fn dynamic_turn<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R) -> Option<String> {
        let behavior = &self.definition(self.dynamics[index].object_type()).behavior;
        if !behavior.takes_turns() {
            return None;
        }
        let collision = behavior.on_collision();

        let mut open = self.open_directions(index);
        let dir = self.dynamics[index].brain.choose(&mut open, rng)?;
        let target = self.dynamics[index].pos().step(dir);

        if self.player_pos() == Some(target) {
            return match self.collide(target, collision) {
                Step::Killed { by } => Some(by),
                Step::Clear => None,
            };
        }
        self.dynamics[index].pos = target;
        None
    }

    /// Run every dynamic once, flagging the cells each one leaves and enters.
    pub(crate) fn advance_dynamics<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        for index in 0..self.dynamics.len() {
            self.mark_dirty(self.dynamics[index].pos());
            let caught = self.dynamic_turn(index, rng);
            self.mark_dirty(self.dynamics[index].pos());
            if caught.is_some() {
                return caught;
            }
        }
        None
    }
}

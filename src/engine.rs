//! Game glue: the scheduler's actors, the stage they act on, and the engine
//! the host loop drives.

use std::fmt;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::Direction;
use crate::config::Settings;
use crate::display::Surface;
use crate::error::GameResult;
use crate::level::Level;
use crate::map::{Map, MapTurn, Recruit, Step};
use crate::scheduler::{Actor, Control, Pending, Scheduler, Turn};

/// Refresh frames between two animation flips.
pub const FLIP_EVERY: u32 = 6;

pub const LAST_LEVEL_NOTICE: &str = "That was the last maze.\nPress q to quit.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameActor {
    Map,
    Player,
    /// Holds the next round back for the given delay.
    Pacer(Duration),
}

impl<S: Surface> Actor<Stage<S>> for GameActor {
    fn act(&mut self, stage: &mut Stage<S>, ctl: &mut Control<'_, Self>) -> Turn {
        match self {
            GameActor::Map => {
                match stage.map_turn() {
                    MapTurn::Victory => {
                        let score = stage.score();
                        stage.finish(Outcome::Victory { score });
                        ctl.stop();
                    }
                    MapTurn::Caught { by } => {
                        let score = stage.score();
                        stage.finish(Outcome::Caught { by, score });
                        ctl.stop();
                    }
                    MapTurn::Idle | MapTurn::Advanced => {}
                }
                Turn::Done
            }
            GameActor::Player => match stage.map.player_mut() {
                Some(player) => player.act(),
                None => Turn::Done,
            },
            GameActor::Pacer(delay) => Turn::Pending(Pending::after(*delay)),
        }
    }

    fn is_bound(&self, stage: &Stage<S>) -> bool {
        match self {
            GameActor::Player => stage.map.player().is_some(),
            GameActor::Map | GameActor::Pacer(_) => true,
        }
    }
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Victory { score: u32 },
    Caught { by: String, score: u32 },
}

impl Outcome {
    pub fn score(&self) -> u32 {
        match self {
            Outcome::Victory { score } | Outcome::Caught { score, .. } => *score,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Victory { score } => write!(
                f,
                "All cakes on map have been nomed!\n\
                 You ended up with score of: {score} points.\n\
                 Press enter to continue."
            ),
            Outcome::Caught { by, score } => write!(
                f,
                "You have been caught by: {by}!\n\
                 Your score is: {score} points.\n\
                 Press enter to try again."
            ),
        }
    }
}

/// Everything the actors touch during a turn.
pub struct Stage<S> {
    pub map: Map,
    pub surface: S,
    rng: StdRng,
    levels: Vec<Box<dyn Level>>,
    current: Option<usize>,
    outcome: Option<Outcome>,
}

impl<S: Surface> Stage<S> {
    fn map_turn(&mut self) -> MapTurn {
        let Some(level) = self.current.and_then(|i| self.levels.get(i)) else {
            return MapTurn::Idle;
        };
        self.map.act(&mut self.surface, level.as_ref(), &mut self.rng)
    }

    fn score(&self) -> u32 {
        self.map.player().map_or(0, |p| p.score())
    }

    fn finish(&mut self, outcome: Outcome) {
        if let Some(player) = self.map.player_mut() {
            player.detach();
        }
        match &outcome {
            Outcome::Victory { score } => log::info!("maze cleared with {score} points"),
            Outcome::Caught { by, score } => log::info!("caught by {by} with {score} points"),
        }
        self.surface.show_notice(&outcome.to_string());
        self.outcome = Some(outcome);
    }
}

pub struct Engine<S: Surface> {
    scheduler: Scheduler<GameActor>,
    stage: Stage<S>,
    level: usize,
    frame_counter: u32,
    pace: Duration,
}

impl<S: Surface> Engine<S> {
    pub fn new(surface: S, levels: Vec<Box<dyn Level>>, settings: Settings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Engine {
            scheduler: Scheduler::new(),
            stage: Stage {
                map: Map::new(0, 0),
                surface,
                rng,
                levels,
                current: None,
                outcome: None,
            },
            level: 0,
            frame_counter: 0,
            pace: settings.pace,
        }
    }

    /// Rebuild the map from the level at `index`. Returns false when there
    /// is no such level.
    pub fn load_level(&mut self, index: usize) -> GameResult<bool> {
        let Some(level) = self.stage.levels.get(index) else {
            return Ok(false);
        };
        let (width, height) = level.size();
        if (width, height) != (self.stage.map.width(), self.stage.map.height()) {
            self.stage.map = Map::new(width, height);
            self.stage.surface.resize(width, height);
        } else {
            self.stage.map.clear();
        }
        self.stage.surface.clear();
        self.stage.surface.hide_notice();

        self.stage.current = None;
        level.load(&mut self.stage.map)?;
        self.stage.current = Some(index);
        log::info!("loaded level {index} ({}) {width}x{height}", level.name());
        Ok(true)
    }

    /// Begin a run: the next level after a victory, the same one otherwise.
    /// Returns false when every level has been cleared.
    pub fn start(&mut self) -> GameResult<bool> {
        if self.scheduler.is_running() {
            log::warn!("start while a run is in progress ignored");
            return Ok(true);
        }
        let next = match self.stage.outcome {
            Some(Outcome::Victory { .. }) => self.level + 1,
            _ => self.level,
        };
        if !self.load_level(next)? {
            self.stage.surface.show_notice(LAST_LEVEL_NOTICE);
            return Ok(false);
        }
        self.level = next;
        self.stage.outcome = None;

        self.scheduler.clear();
        for recruit in self.stage.map.take_recruits() {
            match recruit {
                Recruit::Player => self.scheduler.add(GameActor::Player, &self.stage)?,
            }
        }
        self.scheduler.add(GameActor::Map, &self.stage)?;
        self.scheduler.add(GameActor::Pacer(self.pace), &self.stage)?;
        log::info!("starting level {} with {} actors", self.level, self.scheduler.len());
        self.scheduler.start(&mut self.stage);
        Ok(true)
    }

    /// Tear the run down and stop listening for input.
    pub fn stop(&mut self) {
        if let Some(player) = self.stage.map.player_mut() {
            player.detach();
        }
        self.scheduler.stop();
        log::info!("run stopped");
    }

    /// One refresh frame: redraw what changed, flipping animations every
    /// [`FLIP_EVERY`] frames while a run is going.
    pub fn refresh(&mut self) {
        let flip = self.frame_counter == 0 && self.scheduler.is_running();
        self.frame_counter += 1;
        if self.frame_counter >= FLIP_EVERY {
            self.frame_counter = 0;
        }
        self.stage.map.draw(&mut self.stage.surface, flip);
    }

    /// Resume whatever pending turns are due at `now`.
    pub fn poll(&mut self, now: Instant) -> usize {
        self.scheduler.resume(&mut self.stage, now)
    }

    /// Feed one directional input to the player. Returns whether it was
    /// taken.
    pub fn input(&mut self, dir: Direction) -> bool {
        if !self.scheduler.is_running() {
            return false;
        }
        match self.stage.map.move_player(dir) {
            None => false,
            Some(Step::Clear) => {
                self.stage.map.draw(&mut self.stage.surface, false);
                true
            }
            Some(Step::Killed { by }) => {
                let score = self.stage.score();
                self.stage.finish(Outcome::Caught { by, score });
                self.stop();
                true
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.stage.outcome.as_ref()
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn level_name(&self) -> Option<&str> {
        self.stage
            .current
            .and_then(|i| self.stage.levels.get(i))
            .map(|level| level.name())
    }

    pub fn scheduler(&self) -> &Scheduler<GameActor> {
        &self.scheduler
    }

    pub fn map(&self) -> &Map {
        &self.stage.map
    }

    pub fn surface(&self) -> &S {
        &self.stage.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.stage.surface
    }
}

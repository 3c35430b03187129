//! Precondition failures raised while building levels or wiring actors.
//!
//! None of these are retried. They point at a broken maze or a programming
//! error and are reported at the call site.

use std::error::Error;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameError {
    /// An object type with this name is already defined on the map.
    DuplicateDefinition(String),
    /// Placement referenced a type name that was never defined.
    UnknownType(String),
    /// The target cell already holds a static object, or the player.
    CellOccupied { x: i32, y: i32, by_player: bool },
    /// The coordinates fall outside the map.
    OutOfBounds { x: i32, y: i32 },
    /// The map already has its player.
    PlayerAlreadyPlaced,
    /// The actor handed to the scheduler has nothing that can take a turn.
    InvalidActor(String),
    /// Maze text does not fit the map it is being loaded into.
    MazeTooLarge {
        width: usize,
        height: usize,
        map_width: i32,
        map_height: i32,
    },
    /// Maze rows have different lengths.
    RaggedMaze { row: usize, expected: usize, found: usize },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateDefinition(name) => {
                write!(f, "there is already a type of object named {name}")
            }
            Self::UnknownType(name) => write!(f, "there is no type of object named {name}"),
            Self::CellOccupied { x, y, by_player } => {
                if *by_player {
                    write!(f, "cell {x}:{y} is occupied by the player")
                } else {
                    write!(f, "cell {x}:{y} is already full")
                }
            }
            Self::OutOfBounds { x, y } => write!(f, "cell {x}:{y} is outside the map"),
            Self::PlayerAlreadyPlaced => write!(f, "player already in place"),
            Self::InvalidActor(what) => write!(f, "not a valid actor: {what}"),
            Self::MazeTooLarge {
                width,
                height,
                map_width,
                map_height,
            } => write!(
                f,
                "maze is {width}x{height} but the map is only {map_width}x{map_height}"
            ),
            Self::RaggedMaze {
                row,
                expected,
                found,
            } => write!(
                f,
                "maze row {row} has {found} cells, expected {expected}"
            ),
        }
    }
}

impl Error for GameError {}

pub type GameResult<T> = Result<T, GameError>;

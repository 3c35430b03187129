//! Mazes and their win condition.
//!
//! Maze text is a rectangle of single-character cells, read row by row:
//!
//! | char | meaning |
//! |------|---------|
//! | `W` | wall |
//! | `*` | cake, worth [`FOOD_VALUE`] |
//! | `B` `P` `I` `C` | Blinky, Pinky, Inky and Clyde |
//! | `O` | player start |
//! | anything else | open floor (`_` by convention) |

use crate::error::{GameError, GameResult};
use crate::map::{Map, ScoreBoard};
use crate::objects::{ObjectDefinition, FOOD_VALUE};

pub const FOOD: &str = "food";
pub const WALL: &str = "block";

const GHOSTS: [(char, &str, u16, &str); 4] = [
    ('B', "blinky", 1, "Blinky"),
    ('P', "pinky", 2, "Pinky"),
    ('I', "inky", 3, "Inky"),
    ('C', "clyde", 4, "Clyde"),
];

pub trait Level {
    fn name(&self) -> &str;
    /// Grid size the level needs.
    fn size(&self) -> (i32, i32);
    fn load(&self, map: &mut Map) -> GameResult<()>;
    fn check_victory(&self, map: &Map) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeLevel {
    name: String,
    rows: Vec<Vec<char>>,
    width: usize,
    score_board: Option<ScoreBoard>,
}

impl MazeLevel {
    pub fn parse(name: &str, text: &str) -> GameResult<Self> {
        let mut rows: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        // Rows of spaces are open floor; only empty trailing lines go.
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }

        let rows: Vec<Vec<char>> = rows.iter().map(|r| r.chars().collect()).collect();
        let width = rows.first().map_or(0, |r| r.len());
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(GameError::RaggedMaze {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
        }
        Ok(MazeLevel {
            name: name.to_string(),
            rows,
            width,
            score_board: None,
        })
    }

    pub fn with_score_board(mut self, x: i32, y: i32, size: i32) -> Self {
        self.score_board = Some(ScoreBoard { x, y, size });
        self
    }

    /// Small maze that fits an ordinary terminal.
    pub fn cellar() -> Self {
        Self::parse("Cellar", CELLAR).expect("built-in maze is rectangular")
    }

    /// The full 80x40 maze with the scoreboard in its walled-off room.
    pub fn classic() -> Self {
        Self::parse("Classic", CLASSIC)
            .expect("built-in maze is rectangular")
            .with_score_board(21, 13, 1)
    }

    pub fn builtin() -> Vec<MazeLevel> {
        vec![Self::cellar(), Self::classic()]
    }

    fn define_objects(map: &mut Map) -> GameResult<()> {
        map.define_object(WALL, ObjectDefinition::wall())?;
        for (_, ty, tile, name) in GHOSTS {
            map.define_object(ty, ObjectDefinition::ghost(tile, name))?;
        }
        map.define_object(FOOD, ObjectDefinition::food(FOOD_VALUE))?;
        Ok(())
    }
}

impl Level for MazeLevel {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> (i32, i32) {
        (self.width as i32, self.rows.len() as i32)
    }

    fn load(&self, map: &mut Map) -> GameResult<()> {
        let (width, height) = self.size();
        if width > map.width() || height > map.height() {
            return Err(GameError::MazeTooLarge {
                width: self.width,
                height: self.rows.len(),
                map_width: map.width(),
                map_height: map.height(),
            });
        }

        Self::define_objects(map)?;
        if let Some(board) = self.score_board {
            map.score_board(board.x, board.y, board.size);
        }

        for (y, row) in self.rows.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                let (x, y) = (x as i32, y as i32);
                match cell {
                    'W' => map.place_object(x, y, WALL)?,
                    '*' => map.place_object(x, y, FOOD)?,
                    'O' => map.place_player(x, y, 0)?,
                    c => {
                        if let Some((_, ty, _, _)) = GHOSTS.iter().find(|g| g.0 == *c) {
                            map.add_dynamic(x, y, ty)?;
                        }
                    }
                }
            }
        }
        log::debug!(
            "loaded maze {} ({}x{}), {} cakes",
            self.name,
            width,
            height,
            map.count(FOOD).unwrap_or(0)
        );
        Ok(())
    }

    fn check_victory(&self, map: &Map) -> bool {
        map.count(FOOD) == Some(0)
    }
}

const CELLAR: &str = "\
WWWWWWWWWWWWWWWWWWWWWWWWWWWW
W************WW************W
W*WWWW*WWWWW*WW*WWWWW*WWWW*W
W**************************W
W*WWWW*WW*WWWWWWWW*WW*WWWW*W
W******WW****WW****WW******W
WWWWWW*WWWWW_WW_WWWWW*WWWWWW
WWWWWW*WW__________WW*WWWWWW
WWWWWW*WW_WWW__WWW_WW*WWWWWW
W********_WBP__ICW_********W
WWWWWW*WW_WWWWWWWW_WW*WWWWWW
W************WW************W
W*WWWW*WWWWW*WW*WWWWW*WWWW*W
W*****O********************W
WWWWWWWWWWWWWWWWWWWWWWWWWWWW
";

const CLASSIC: &str = "\
WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW
WWW***********************************____***********************************WWW
WWW*WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW__O_WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW*WWW
W*************************************____*************************************W
W*W*WWWWWWWWWWWWWWWWW_WWWWWWWWWWWWWWWW_WW_WWWWWWWWWWWWWWWW_WWWWWWWWWWWWWWWWW*W*W
W*W*WW*******************************W_WW_W*******************************WW*W*W
W*W*WW*WWWWWWWWWWWWWWWWWWWWWWWWWWWWW*W_WW_W*WWWWWWWWWWWWWWWWWWWWWWWWWWWWW*WW*W*W
W*W*WW*WW*************************WW*W_WW_W*WW*************************WW*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*W_WW_W*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*W_WW_W*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WW___________________WW*WW*W_WW_W*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WW___________________WW*WW*W_WW_W*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WW___________________WW*WW*W_WW_W*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WW___________________WW*WW*W****W*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*__*WW___________________WW*WW*WWWWWW*WW*WWWWWWWWWWWWWWWWWWWWWWW*__*WW*W*W
W*W*WW*WW*WW___________________WW*WW********WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WWWW_WW_WWWW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WWWW_WW_WWWW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW**************************************************************WW*WW*W*W
W*W*__*WWWWW_WWWWWWWWWWWWWWWWWWWWWWWWW_PI_WWWWWWWWWWWWWWWWWWWWWWWWW_WWWWW*__*W*W
W*W*WW*WWWWW_WWWWWWWWWWWWWWWWWWWWWWWWW_CB_WWWWWWWWWWWWWWWWWWWWWWWWW_WWWWW*WW*W*W
W*W*WW*WW**************************************************************WW*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WWWW_WW_WWWW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WWWW_WW_WWWW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW********WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*__*WWWWWWWWWWWWWWWWWWWWWWW*WW*WWWWWW*WW*WWWWWWWWWWWWWWWWWWWWWWW*__*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*W****W*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*W*WW*W*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*W*WW*W*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*W*WW*W*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*W*WW*W*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*W*WW*W*WW*WWWWWWWWWWWWWWWWWWWWWWW*WW*WW*W*W
W*W*WW*WW*************************WW*W*WW*W*WW*************************WW*WW*W*W
W*W*WW*WWWWWWWWWWWWWWWWWWWWWWWWWWWWW*W*WW*W*WWWWWWWWWWWWWWWWWWWWWWWWWWWWW*WW*W*W
W*W*WW*******************************W*WW*W*******************************WW*W*W
W*W*WWWWWWWWWWWWWWWWW_WWWWWWWWWWWWWWWW*WW*WWWWWWWWWWWWWWWW_WWWWWWWWWWWWWWWWW*W*W
W**************************************WW**************************************W
WWW*WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW****WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW*WWW
WWW************************************WW************************************WWW
WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW
";

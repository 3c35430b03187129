/// Cardinal heading. The numeric code doubles as the first sprite frame
/// for that heading, each heading owning two animation frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    West,
    North,
    South,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::North,
        Direction::South,
    ];

    pub fn code(self) -> u16 {
        match self {
            Direction::East => 0,
            Direction::West => 2,
            Direction::North => 4,
            Direction::South => 6,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Direction::East),
            2 => Some(Direction::West),
            4 => Some(Direction::North),
            6 => Some(Direction::South),
            _ => None,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
            Direction::South => (0, 1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    pub fn step(self, dir: Direction) -> Pos {
        let (dx, dy) = dir.delta();
        Pos {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

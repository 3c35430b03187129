use crossterm::style::Color;

pub const FOOD_VALUE: u32 = 10;
pub const FOOD_TILE: u16 = 5;
pub const WALL_COLOR: Color = Color::Rgb {
    r: 0x66,
    g: 0x66,
    b: 0x66,
};

/// Interned handle for a defined object type, valid for the map that
/// issued it until the next clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectType(pub(crate) u16);

impl ObjectType {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Behavior {
    Inert,
    Food { value: u32 },
    Ghost { name: String },
}

/// What happens when the player and an object meet on one cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Collision {
    Nothing,
    Eat(u32),
    Kill(String),
}

impl Behavior {
    pub fn on_collision(&self) -> Collision {
        match self {
            Behavior::Inert => Collision::Nothing,
            Behavior::Food { value } => Collision::Eat(*value),
            Behavior::Ghost { name } => Collision::Kill(format!("{name} the ghost")),
        }
    }

    pub fn takes_turns(&self) -> bool {
        matches!(self, Behavior::Ghost { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDefinition {
    pub tile: Option<u16>,
    pub frame: Option<u16>,
    /// Only used when there is no tile.
    pub color: Option<Color>,
    pub impassable: bool,
    pub behavior: Behavior,
}

impl ObjectDefinition {
    pub fn wall() -> Self {
        ObjectDefinition {
            tile: None,
            frame: None,
            color: Some(WALL_COLOR),
            impassable: true,
            behavior: Behavior::Inert,
        }
    }

    pub fn food(value: u32) -> Self {
        ObjectDefinition {
            tile: Some(FOOD_TILE),
            frame: Some(1),
            color: None,
            impassable: false,
            behavior: Behavior::Food { value },
        }
    }

    pub fn ghost(tile: u16, name: &str) -> Self {
        ObjectDefinition {
            tile: Some(tile),
            frame: None,
            color: None,
            impassable: true,
            behavior: Behavior::Ghost {
                name: name.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ghosts_name_themselves_as_the_cause() {
        let blinky = ObjectDefinition::ghost(1, "Blinky");
        assert_eq!(
            blinky.behavior.on_collision(),
            Collision::Kill("Blinky the ghost".to_string())
        );
        assert!(blinky.behavior.takes_turns());
    }

    #[test]
    fn food_is_passable_and_edible() {
        let food = ObjectDefinition::food(FOOD_VALUE);
        assert!(!food.impassable);
        assert_eq!(food.behavior.on_collision(), Collision::Eat(10));
        assert!(!food.behavior.takes_turns());
        assert!(ObjectDefinition::wall().impassable);
    }
}

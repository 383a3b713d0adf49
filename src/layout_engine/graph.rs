use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Axis along which a branch divides its area between its two children.
///
/// `Row` places the children side by side, `Column` stacks them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    Row,
    Column,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Row => Direction::Column,
            Direction::Column => Direction::Row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_flips_axis() {
        assert_eq!(Direction::Row.opposite(), Direction::Column);
        assert_eq!(Direction::Column.opposite(), Direction::Row);
        assert_eq!(Direction::Row.opposite().opposite(), Direction::Row);
    }

    #[test]
    fn parses_and_displays_lowercase() {
        assert_eq!("row".parse::<Direction>(), Ok(Direction::Row));
        assert_eq!("column".parse::<Direction>(), Ok(Direction::Column));
        assert!("diagonal".parse::<Direction>().is_err());
        assert_eq!(Direction::Column.to_string(), "column");
    }
}

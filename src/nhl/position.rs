use std::fmt;
use std::str::FromStr;

/// Player role; each has its own bios endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Position {
    Skater,
    Goalie,
}

impl Position {
    pub const ALL: [Position; 2] = [Position::Skater, Position::Goalie];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Skater => "skater",
            Position::Goalie => "goalie",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skater" => Ok(Position::Skater),
            "goalie" => Ok(Position::Goalie),
            other => Err(format!("unknown position '{other}', expected skater or goalie")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_position() {
        assert_eq!("Goalie".parse::<Position>(), Ok(Position::Goalie));
        assert_eq!(" skater ".parse::<Position>(), Ok(Position::Skater));
        assert!("defense".parse::<Position>().is_err());
        assert_eq!(Position::ALL.map(Position::as_str), ["skater", "goalie"]);
    }
}

use crate::nhl::Position;
use crate::seasons::SeasonId;

pub const DEFAULT_PREFIX: &str = "nhl-player-bios";

#[must_use]
pub fn bios_file_name(position: Position, season: SeasonId) -> String {
    format!("{position}-bios-{season}.json")
}

#[must_use]
pub fn bios_key(prefix: &str, position: Position, season: SeasonId) -> String {
    let prefix = prefix.trim_matches('/');
    let file_name = bios_file_name(position, season);
    if prefix.is_empty() {
        file_name
    } else {
        format!("{prefix}/{file_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        assert_eq!(
            bios_key(DEFAULT_PREFIX, Position::Skater, SeasonId(20232024)),
            "nhl-player-bios/skater-bios-20232024.json"
        );
        assert_eq!(
            bios_key("/raw/bios/", Position::Goalie, SeasonId(19171918)),
            "raw/bios/goalie-bios-19171918.json"
        );
        assert_eq!(
            bios_key("", Position::Goalie, SeasonId(20222023)),
            "goalie-bios-20222023.json"
        );
    }
}

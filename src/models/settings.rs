use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::models::types::{PlayerId, TOKEN_SIZE};
use crate::utils::errors::SettingsError;
use crate::utils::logger::LogLevel;

/// Fixed game parameters, read once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub deck_size: u32,
    pub table_size: usize,
    pub tokens_per_claim: usize,
    pub human_players: usize,
    pub computer_players: usize,
    pub player_names: Vec<String>,

    pub turn_timeout_millis: u64,
    pub turn_timeout_warning_millis: u64,
    pub point_freeze_millis: u64,
    pub penalty_freeze_millis: u64,
    pub end_game_pause_millis: u64,
    pub table_delay_millis: u64,
    pub ai_delay_millis: u64,

    pub reset_timer_on_set: bool,
    pub seed: Option<u64>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deck_size: 81,
            table_size: 12,
            tokens_per_claim: TOKEN_SIZE,
            human_players: 0,
            computer_players: 2,
            player_names: Vec::new(),

            turn_timeout_millis: 60_000,
            turn_timeout_warning_millis: 5_000,
            point_freeze_millis: 1_000,
            penalty_freeze_millis: 3_000,
            end_game_pause_millis: 5_000,
            table_delay_millis: 0,
            ai_delay_millis: 2,

            reset_timer_on_set: true,
            seed: None,
            log_level: "INFO".to_string(),
        }
    }
}

impl Settings {
    /// Loads the settings from `settings.toml` (or the file named by `SET_CONFIG`)
    /// and `SET_*` environment variables, on top of the defaults.
    pub fn load() -> Result<Self, SettingsError> {
        let path = std::env::var("SET_CONFIG").unwrap_or_else(|_| "settings".to_string());
        let settings = Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("SET")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("player_names"),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from a TOML document. Missing keys keep their defaults.
    pub fn from_toml(source: &str) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Rejects configurations that make the game unplayable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.players() == 0 {
            return Err(SettingsError::InvalidValue(
                "players",
                "at least one human or computer player is required".to_string(),
            ));
        }
        if self.tokens_per_claim != TOKEN_SIZE {
            return Err(SettingsError::InvalidValue(
                "tokens_per_claim",
                format!("a claim is always made of {TOKEN_SIZE} tokens, got {}", self.tokens_per_claim),
            ));
        }
        if self.table_size < TOKEN_SIZE {
            return Err(SettingsError::InvalidValue(
                "table_size",
                format!("the table needs at least {TOKEN_SIZE} slots, got {}", self.table_size),
            ));
        }
        if (self.deck_size as usize) < self.table_size {
            return Err(SettingsError::InvalidValue(
                "deck_size",
                format!("{} cards cannot fill {} slots", self.deck_size, self.table_size),
            ));
        }
        if self.turn_timeout_millis == 0 {
            return Err(SettingsError::InvalidValue(
                "turn_timeout_millis",
                "must be greater than zero".to_string(),
            ));
        }
        if LogLevel::parse(&self.log_level).is_none() {
            return Err(SettingsError::InvalidValue(
                "log_level",
                format!("unknown level `{}`", self.log_level),
            ));
        }

        Ok(())
    }

    pub fn players(&self) -> usize {
        self.human_players + self.computer_players
    }

    /// Human players take the lowest ids, computer players follow.
    pub fn is_human(&self, id: PlayerId) -> bool {
        id < self.human_players
    }

    pub fn player_name(&self, id: PlayerId) -> String {
        self.player_names
            .get(id)
            .cloned()
            .unwrap_or_else(|| format!("Player {}", id + 1))
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level).unwrap_or(LogLevel::Info)
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_millis)
    }

    pub fn turn_timeout_warning(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_warning_millis)
    }

    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.point_freeze_millis)
    }

    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_millis)
    }

    pub fn end_game_pause(&self) -> Duration {
        Duration::from_millis(self.end_game_pause_millis)
    }

    pub fn table_delay(&self) -> Duration {
        Duration::from_millis(self.table_delay_millis)
    }

    pub fn ai_delay(&self) -> Duration {
        Duration::from_millis(self.ai_delay_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_playable() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.players(), 2);
        assert_eq!(settings.turn_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let settings = Settings::from_toml(
            r#"
            deck_size = 12
            table_size = 3
            human_players = 1
            computer_players = 1
            player_names = ["Ada", "Bot"]
            seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(settings.deck_size, 12);
        assert_eq!(settings.table_size, 3);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.penalty_freeze_millis, 3_000);
        assert!(settings.is_human(0));
        assert!(!settings.is_human(1));
        assert_eq!(settings.player_name(0), "Ada");
    }

    #[test]
    fn test_missing_names_are_numbered() {
        let settings = Settings::default();
        assert_eq!(settings.player_name(1), "Player 2");
    }

    #[test]
    fn test_zero_players_is_rejected() {
        let result = Settings::from_toml("computer_players = 0");
        assert!(matches!(result, Err(SettingsError::InvalidValue("players", _))));
    }

    #[test]
    fn test_claim_size_other_than_three_is_rejected() {
        let result = Settings::from_toml("tokens_per_claim = 4");
        assert!(matches!(result, Err(SettingsError::InvalidValue("tokens_per_claim", _))));
    }

    #[test]
    fn test_deck_smaller_than_table_is_rejected() {
        let result = Settings::from_toml("deck_size = 5\ntable_size = 6");
        assert!(matches!(result, Err(SettingsError::InvalidValue("deck_size", _))));
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let result = Settings::from_toml("log_level = \"loud\"");
        assert!(matches!(result, Err(SettingsError::InvalidValue("log_level", _))));
    }
}

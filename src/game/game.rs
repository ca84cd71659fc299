use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::game::dealer::{Dealer, Seat};
use crate::game::input::{ComputerInput, PlayerHandle};
use crate::game::player::{Player, PlayerTask};
use crate::game::table::Table;
use crate::logger;
use crate::models::settings::Settings;
use crate::models::types::PlayerId;
use crate::ui::interface::UserInterface;
use crate::utils::errors::{GameError, SettingsError};
use crate::utils::shutdown::Terminator;

/// One game: the table, its players and the dealer that runs them.
pub struct GameInstance {
    pub id: Uuid,
    settings: Arc<Settings>,
    table: Arc<Table>,
    players: Vec<Arc<Player>>,
    handles: Vec<PlayerHandle>,
    terminator: Terminator,
    dealer: Dealer,
}

impl GameInstance {
    /// Builds every component from `settings`. Nothing runs until [`GameInstance::run`].
    pub fn create_instance(
        settings: Settings,
        ui: Arc<dyn UserInterface>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let settings = Arc::new(settings);
        let id = Uuid::new_v4();
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let table = Arc::new(Table::new(settings.table_size, settings.deck_size, Arc::clone(&ui)));
        let (claims, claims_rx) = mpsc::channel(settings.players());
        let (terminator, stop) = Terminator::new();

        let mut players = Vec::with_capacity(settings.players());
        let mut handles = Vec::with_capacity(settings.players());
        let mut seats = Vec::with_capacity(settings.players());
        for id in 0..settings.players() {
            let human = settings.is_human(id);
            let player = Arc::new(Player::new(
                id,
                settings.player_name(id),
                human,
                Arc::clone(&table),
                Arc::clone(&ui),
                settings.point_freeze(),
                settings.penalty_freeze(),
            ));

            let (sender, selections) = mpsc::channel(1);
            let (stop_sender, player_stop) = watch::channel(false);
            let handle = PlayerHandle::new(id, Arc::clone(&table), sender);
            let computer = (!human).then(|| {
                ComputerInput::new(
                    handle.clone(),
                    settings.table_size,
                    settings.ai_delay(),
                    StdRng::from_rng(&mut rng),
                    player_stop.clone(),
                )
            });

            let task = PlayerTask::new(Arc::clone(&player), selections, claims.clone(), player_stop, computer);
            seats.push(Seat::new(Arc::clone(&player), task, stop_sender));
            players.push(player);
            handles.push(handle);
        }

        let dealer = Dealer::new(
            Arc::clone(&settings),
            Arc::clone(&table),
            ui,
            seats,
            claims_rx,
            stop,
            rng,
        );

        logger!(
            INFO,
            "[GAME] Created game `{id}` with {} human and {} computer players",
            settings.human_players,
            settings.computer_players
        );

        Ok(Self { id, settings, table, players, handles, terminator, dealer })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn table(&self) -> Arc<Table> {
        Arc::clone(&self.table)
    }

    pub fn players(&self) -> Vec<Arc<Player>> {
        self.players.clone()
    }

    pub fn handle(&self, id: PlayerId) -> Option<PlayerHandle> {
        self.handles.get(id).cloned()
    }

    /// Input handles of the human players, for an external input source.
    pub fn human_handles(&self) -> Vec<PlayerHandle> {
        self.handles
            .iter()
            .filter(|handle| self.settings.is_human(handle.id))
            .cloned()
            .collect()
    }

    pub fn terminator(&self) -> Terminator {
        self.terminator.clone()
    }

    /// Runs the dealer on its own task until the game ends. Returns the winners.
    pub async fn run(self) -> Result<Vec<PlayerId>, GameError> {
        let GameInstance { id, terminator, dealer, .. } = self;
        logger!(INFO, "[GAME] Game `{id}` starting");

        let winners = tokio::spawn(dealer.run()).await?;
        drop(terminator);

        logger!(INFO, "[GAME] Game `{id}` finished");
        Ok(winners)
    }
}

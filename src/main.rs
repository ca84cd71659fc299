use std::io;
use std::sync::Arc;

use set_game::game::game::GameInstance;
use set_game::logger;
use set_game::models::settings::Settings;
use set_game::ui::console::ConsoleUi;
use set_game::ui::interface::UserInterface;
use set_game::ui::keyboard;
use set_game::utils::errors::GameError;
use set_game::utils::logger::Logger;

#[tokio::main]
async fn main() -> Result<(), GameError> {
    let settings = Settings::load()?;
    Logger::set_level(settings.log_level());

    let ui = Arc::new(ConsoleUi::new());
    let game = GameInstance::create_instance(settings, ui.clone())?;

    let humans = game.human_handles();
    if !humans.is_empty() {
        logger!(INFO, "Type `<player> <slot>` to select a slot");
        keyboard::spawn(io::BufReader::new(io::stdin()), humans);
    }

    let terminator = game.terminator();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger!(WARN, "Interrupted, ending the game");
            terminator.terminate();
        }
    });

    let winners = game.run().await?;
    logger!(INFO, "Winners: {:?}", winners);
    ui.dispose();
    Ok(())
}

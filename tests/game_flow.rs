use std::sync::Arc;
use std::time::Duration;

use set_game::game::game::GameInstance;
use set_game::game::player::tokens_agree;
use set_game::game::set_validator::is_set;
use set_game::models::settings::Settings;
use set_game::models::ui_event::UiEvent;
use set_game::ui::recording::RecordingUi;
use set_game::utils::logger::Logger;
use tokio::time::{sleep, timeout, Instant};

fn quiet(settings: Settings) -> Settings {
    let settings = Settings { end_game_pause_millis: 0, log_level: "ERROR".to_string(), ..settings };
    Logger::set_level(settings.log_level());
    settings
}

#[tokio::test(start_paused = true)]
async fn test_claim_on_the_first_deal() {
    let settings = quiet(Settings {
        deck_size: 12,
        table_size: 3,
        human_players: 1,
        computer_players: 0,
        seed: Some(11),
        ..Settings::default()
    });
    let ui = Arc::new(RecordingUi::new());
    let game = GameInstance::create_instance(settings, ui.clone()).unwrap();
    let table = game.table();
    let player = Arc::clone(&game.players()[0]);
    let handle = game.handle(0).unwrap();
    let terminator = game.terminator();
    let running = tokio::spawn(game.run());

    while table.count_cards().await < 3 {
        sleep(Duration::from_millis(10)).await;
    }
    let [card1, card2, card3] = table.cards_at(&[0, 1, 2]).await.unwrap();
    let legal = is_set(card1, card2, card3);

    let before = Instant::now();
    for slot in 0..3 {
        assert!(handle.key_pressed(slot).await);
    }
    while player.score() == 0 && player.freeze_until().await.is_none() {
        sleep(Duration::from_millis(1)).await;
    }

    if legal {
        assert_eq!(player.score(), 1);
        // The freed slots are dealt again from the nine cards left.
        while table.count_cards().await < 3 {
            sleep(Duration::from_millis(1)).await;
        }
        for card in [card1, card2, card3] {
            assert_eq!(table.slot_of(card).await, None);
        }
    } else {
        assert_eq!(player.score(), 0);
        let until = player.freeze_until().await.unwrap();
        assert!(until >= before + Duration::from_millis(3000));
        assert!(until <= before + Duration::from_millis(3100));
        assert_eq!(table.cards_at(&[0, 1, 2]).await, Some([card1, card2, card3]));
    }
    assert!(player.tokens().await.is_empty());
    for slot in 0..3 {
        assert!(table.tokens_at(slot).await.is_empty());
    }
    assert!(tokens_agree(&[Arc::clone(&player)], &table).await);

    terminator.terminate();
    let winners = running.await.unwrap().unwrap();
    assert_eq!(winners, vec![0]);
}

#[tokio::test(start_paused = true)]
async fn test_computer_game_runs_to_completion() {
    let settings = quiet(Settings {
        deck_size: 9,
        table_size: 3,
        computer_players: 2,
        turn_timeout_millis: 2_000,
        turn_timeout_warning_millis: 500,
        point_freeze_millis: 100,
        penalty_freeze_millis: 100,
        seed: Some(5),
        ..Settings::default()
    });
    let ui = Arc::new(RecordingUi::new());
    let game = GameInstance::create_instance(settings, ui.clone()).unwrap();
    let table = game.table();
    let players = game.players();

    let winners = timeout(Duration::from_secs(3600), game.run())
        .await
        .expect("the game ends on its own")
        .unwrap();

    let scores: Vec<u32> = players.iter().map(|p| p.score()).collect();
    let best = *scores.iter().max().unwrap();
    let expected: Vec<usize> = (0..scores.len()).filter(|&id| scores[id] == best).collect();
    assert_eq!(winners, expected);
    assert_eq!(ui.winners(), Some(expected));

    // Every point took three cards out of a nine card deck for good.
    let total: u32 = scores.iter().sum();
    assert!(total >= 1 && total <= 3);
    assert_eq!(table.count_cards().await, 0);
    assert!(table.is_consistent().await);
    for player in &players {
        assert!(player.tokens().await.is_empty());
    }
    assert!(tokens_agree(&players, &table).await);

    let taken: Vec<u32> = ui
        .events()
        .iter()
        .filter_map(|event| match event {
            UiEvent::SetScore { score, .. } => Some(*score),
            _ => None,
        })
        .collect();
    assert_eq!(taken.len() as u32, total);
}

#[tokio::test(start_paused = true)]
async fn test_external_termination_stops_every_task() {
    let settings = quiet(Settings { computer_players: 3, seed: Some(2), ..Settings::default() });
    let ui = Arc::new(RecordingUi::new());
    let game = GameInstance::create_instance(settings, ui.clone()).unwrap();
    let players = game.players();
    let table = game.table();
    let terminator = game.terminator();
    let running = tokio::spawn(game.run());

    sleep(Duration::from_secs(30)).await;
    terminator.terminate();
    let winners = running.await.unwrap().unwrap();

    let best = players.iter().map(|p| p.score()).max().unwrap();
    let expected: Vec<usize> = players.iter().filter(|p| p.score() == best).map(|p| p.id).collect();
    assert_eq!(winners, expected);
    assert!(table.is_consistent().await);
    assert!(tokens_agree(&players, &table).await);
    assert_eq!(ui.count(|e| matches!(e, UiEvent::AnnounceWinners { .. })), 1);
}

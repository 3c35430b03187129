use std::time::{Duration, Instant};

use pacman_grid::components::{Direction, Pos};
use pacman_grid::config::Settings;
use pacman_grid::display::{DrawCall, Recorder};
use pacman_grid::engine::{Engine, Outcome, LAST_LEVEL_NOTICE};
use pacman_grid::level::{Level, MazeLevel, FOOD};
use pacman_grid::map::IDLE_NOTICE;

fn engine(mazes: &[(&str, &str)]) -> Engine<Recorder> {
    let levels = mazes
        .iter()
        .map(|(name, text)| Box::new(MazeLevel::parse(name, text).unwrap()) as Box<dyn Level>)
        .collect();
    let settings = Settings {
        pace: Duration::from_millis(20),
        seed: Some(42),
    };
    Engine::new(Recorder::new(), levels, settings)
}

/// Let the pacing delay run out and play the next round.
fn next_round(engine: &mut Engine<Recorder>) -> usize {
    engine.poll(Instant::now() + Duration::from_secs(1))
}

#[test]
fn waits_for_the_first_move() {
    let mut engine = engine(&[("hall", "O_*_B")]);
    assert!(engine.start().unwrap());
    assert_eq!(engine.surface().notice.as_deref(), Some(IDLE_NOTICE));

    // Ghosts hold still until the player moves.
    for _ in 0..5 {
        assert_eq!(next_round(&mut engine), 1);
    }
    assert_eq!(engine.map().dynamics()[0].pos(), Pos::new(4, 0));
    assert_eq!(engine.surface().notices_shown, 1);

    assert!(engine.input(Direction::East));
    next_round(&mut engine);
    assert_eq!(engine.surface().notice, None);
    assert_eq!(engine.map().dynamics()[0].pos(), Pos::new(3, 0));
}

#[test]
fn eating_the_last_cake_wins() {
    let mut engine = engine(&[("snack", "WWWW\nWO*W\nWWWW")]);
    engine.start().unwrap();
    engine.surface_mut().take();

    assert!(engine.input(Direction::East));
    assert!(!engine.input(Direction::East));
    let calls = engine.surface_mut().take();
    assert!(calls.contains(&DrawCall::ClearTile { x: 1, y: 1 }));
    assert!(calls.contains(&DrawCall::Tile {
        x: 2,
        y: 1,
        tile: 0,
        frame: 0
    }));
    assert_eq!(engine.map().count(FOOD), Some(0));
    assert_eq!(engine.map().player().unwrap().score(), 10);

    next_round(&mut engine);
    assert!(!engine.is_running());
    assert_eq!(engine.outcome(), Some(&Outcome::Victory { score: 10 }));
    let notice = engine.surface().notice.clone().unwrap();
    assert!(notice.contains("All cakes on map have been nomed!"));
    assert!(notice.contains("10 points"));

    // Input is detached once the run is over.
    assert!(!engine.map().player().unwrap().is_ready());
    assert!(!engine.input(Direction::West));
    assert_eq!(next_round(&mut engine), 0);
}

#[test]
fn walking_into_a_ghost_ends_the_run() {
    let mut engine = engine(&[("ambush", "OB")]);
    engine.start().unwrap();
    assert!(engine.input(Direction::East));
    assert!(!engine.is_running());
    assert_eq!(
        engine.outcome(),
        Some(&Outcome::Caught {
            by: "Blinky the ghost".to_string(),
            score: 0
        })
    );
    assert_eq!(engine.map().player_pos(), Some(Pos::new(0, 0)));
    assert!(engine
        .surface()
        .notice
        .as_deref()
        .unwrap()
        .starts_with("You have been caught by: Blinky the ghost!"));
}

#[test]
fn ghost_hunts_down_an_idle_player() {
    let mut engine = engine(&[("hall", "O_*_B")]);
    engine.start().unwrap();
    assert!(engine.input(Direction::East));

    let mut rounds = 0;
    while engine.is_running() {
        next_round(&mut engine);
        rounds += 1;
        assert!(rounds < 10, "ghost never arrived");
    }
    assert_eq!(rounds, 3);
    assert_eq!(
        engine.outcome(),
        Some(&Outcome::Caught {
            by: "Blinky the ghost".to_string(),
            score: 0
        })
    );
    // The ghost stops next to its catch, on the cake it never eats.
    assert_eq!(engine.map().dynamics()[0].pos(), Pos::new(2, 0));
    assert_eq!(engine.map().count(FOOD), Some(1));
}

#[test]
fn pending_round_after_stop_is_dropped() {
    let mut engine = engine(&[("hall", "O_*_B")]);
    engine.start().unwrap();
    assert!(engine.input(Direction::East));
    assert_eq!(engine.scheduler().parked(), 1);

    engine.stop();
    assert_eq!(engine.scheduler().parked(), 0);
    assert_eq!(next_round(&mut engine), 0);
    assert_eq!(engine.map().dynamics()[0].pos(), Pos::new(4, 0));
    assert_eq!(engine.scheduler().depth(), 1);
}

#[test]
fn death_retries_the_same_maze() {
    let mut engine = engine(&[("ambush", "OB"), ("next", "O*_")]);
    engine.start().unwrap();
    engine.input(Direction::East);
    assert!(!engine.is_running());

    assert!(engine.start().unwrap());
    assert!(engine.is_running());
    assert_eq!(engine.level(), 0);
    assert_eq!(engine.outcome(), None);
    assert_eq!(engine.map().player_pos(), Some(Pos::new(0, 0)));
    assert_eq!(engine.surface().notice.as_deref(), Some(IDLE_NOTICE));
}

#[test]
fn victory_moves_on_until_the_mazes_run_out() {
    let mut engine = engine(&[("first", "O*"), ("second", "_\nO\n*")]);
    engine.start().unwrap();
    assert_eq!(engine.level_name(), Some("first"));
    engine.input(Direction::East);
    next_round(&mut engine);
    assert!(matches!(engine.outcome(), Some(Outcome::Victory { .. })));

    assert!(engine.start().unwrap());
    assert_eq!(engine.level(), 1);
    assert_eq!(engine.level_name(), Some("second"));
    assert_eq!(engine.surface().size, (1, 3));
    assert_eq!(engine.map().player().unwrap().score(), 0);

    engine.input(Direction::South);
    next_round(&mut engine);
    assert_eq!(engine.outcome(), Some(&Outcome::Victory { score: 10 }));

    assert!(!engine.start().unwrap());
    assert!(!engine.is_running());
    assert_eq!(engine.surface().notice.as_deref(), Some(LAST_LEVEL_NOTICE));
}

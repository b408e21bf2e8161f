mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;

use common::{DrawOp, Ev, FixedSprites, RecordingRenderer, ScriptedInput, CHAR_WIDTH, SHIP};
use space_invaders::config::GameConfig;
use space_invaders::entities::ShotOwner;
use space_invaders::error::GameError;
use space_invaders::game::{Game, DEATH_MESSAGE, PAUSE_TEXT, PRESS_ANY_KEY};
use space_invaders::input::{Key, MouseButton};
use space_invaders::render::{Color, ALIEN_SPRITE};
use space_invaders::timer::{Clock, ManualClock};

type TestGame = Game<ManualClock, StdRng>;

fn new_game(level: u32) -> (TestGame, ManualClock) {
    let clock = ManualClock::new(0);
    let game = Game::new(
        GameConfig::default(),
        &mut FixedSprites::default(),
        clock.clone(),
        StdRng::seed_from_u64(7),
        level,
    )
    .expect("game builds");
    (game, clock)
}

/// Run `n` frames with whatever `input` has queued.
fn frames(game: &mut TestGame, input: &mut ScriptedInput, renderer: &mut RecordingRenderer, n: usize) {
    for _ in 0..n {
        game.frame(input, renderer).expect("frame runs");
    }
}

/// A game already past the "press any key" screen.
fn started_game() -> (TestGame, ManualClock, RecordingRenderer) {
    let (mut game, clock) = new_game(1);
    let mut renderer = RecordingRenderer::default();
    let mut input = ScriptedInput::new().then(&[Ev::Down(Key::Char('x')), Ev::Typed(Key::Char('x'))]);
    frames(&mut game, &mut input, &mut renderer, 1);
    assert!(!game.state().input.is_waiting_for_key_press());
    (game, clock, renderer)
}

fn ship_x(game: &TestGame) -> f32 {
    game.state().world.ship().map(|s| s.x()).expect("ship alive")
}

// ── Startup ───────────────────────────────────────────────────────────────────

#[test]
fn opens_on_press_any_key() {
    let (mut game, _clock) = new_game(1);
    assert!(game.state().input.is_waiting_for_key_press());

    let mut renderer = RecordingRenderer::default();
    frames(&mut game, &mut ScriptedInput::new(), &mut renderer, 1);
    assert_eq!(renderer.last_texts(), vec![PRESS_ANY_KEY.to_string(), "Level 1".to_string()]);
}

#[test]
fn overlay_text_is_centered() {
    let (mut game, _clock) = new_game(1);
    let mut renderer = RecordingRenderer::default();
    frames(&mut game, &mut ScriptedInput::new(), &mut renderer, 1);

    let prompt_x = (800.0 - PRESS_ANY_KEY.len() as f32 * CHAR_WIDTH) / 2.0;
    assert!(renderer
        .last_frame()
        .contains(&DrawOp::Text(PRESS_ANY_KEY.to_string(), prompt_x, 300.0, Color::White)));
}

#[test]
fn missing_sprite_fails_startup() {
    let mut loader = FixedSprites { missing: Some(ALIEN_SPRITE) };
    let err = Game::new(
        GameConfig::default(),
        &mut loader,
        ManualClock::new(0),
        StdRng::seed_from_u64(7),
        1,
    )
    .err();
    assert!(matches!(err, Some(GameError::MissingSprite(name)) if name == ALIEN_SPRITE));
}

#[test]
fn invalid_config_fails_startup() {
    let mut config = GameConfig::default();
    config.timing.frame_ms = 0;
    let err = Game::new(
        config,
        &mut FixedSprites::default(),
        ManualClock::new(0),
        StdRng::seed_from_u64(7),
        1,
    )
    .err();
    assert!(matches!(err, Some(GameError::InvalidConfig(_))));
}

#[test]
fn typed_key_starts_play() {
    let (game, _clock, renderer) = started_game();
    assert_eq!(game.state().world.level(), 1);
    assert_eq!(renderer.last_texts(), vec!["Level 1".to_string()]);
}

// ── Frame pipeline ────────────────────────────────────────────────────────────

#[test]
fn every_frame_clears_then_presents() {
    let (mut game, _clock, mut renderer) = started_game();
    frames(&mut game, &mut ScriptedInput::new(), &mut renderer, 3);

    assert_eq!(renderer.frames.len(), 4);
    for frame in &renderer.frames {
        assert_eq!(frame.first(), Some(&DrawOp::Clear(Color::Black)));
    }
    assert_eq!(renderer.presented, 4);
    assert_eq!(renderer.released, renderer.frames.len());
}

#[test]
fn entities_are_drawn_each_frame() {
    let (mut game, _clock, mut renderer) = started_game();
    frames(&mut game, &mut ScriptedInput::new(), &mut renderer, 1);
    assert!(renderer
        .last_frame()
        .contains(&DrawOp::Sprite(SHIP.handle, 370.0, 550.0)));
}

#[test]
fn frames_are_paced_by_the_clock() {
    let (mut game, clock, mut renderer) = started_game();
    assert_eq!(clock.now_ms(), 10);
    frames(&mut game, &mut ScriptedInput::new(), &mut renderer, 5);
    assert_eq!(clock.now_ms(), 60);
}

#[test]
fn held_direction_moves_the_ship() {
    let (mut game, _clock, mut renderer) = started_game();
    let mut input = ScriptedInput::new().then(&[Ev::Down(Key::Left)]);

    // The velocity set this frame is applied on the next.
    frames(&mut game, &mut input, &mut renderer, 1);
    assert_eq!(ship_x(&game), 370.0);
    frames(&mut game, &mut input, &mut renderer, 1);
    assert!((ship_x(&game) - 367.0).abs() < 1e-3);

    input.push(&[Ev::Up(Key::Left)]);
    frames(&mut game, &mut input, &mut renderer, 2);
    assert!((ship_x(&game) - 364.0).abs() < 1e-3);
}

#[test]
fn pause_freezes_the_world() {
    let (mut game, _clock, mut renderer) = started_game();
    let mut input = ScriptedInput::new()
        .then(&[Ev::Down(Key::Left)])
        .then(&[Ev::Typed(Key::Char('p'))]);
    frames(&mut game, &mut input, &mut renderer, 3);

    assert!(game.state().input.pause_pressed);
    assert_eq!(ship_x(&game), 370.0);
    assert!(renderer.last_texts().contains(&PAUSE_TEXT.to_string()));

    input.push(&[Ev::Typed(Key::Char('p'))]);
    frames(&mut game, &mut input, &mut renderer, 1);
    assert!(ship_x(&game) < 370.0);
    assert!(!renderer.last_texts().contains(&PAUSE_TEXT.to_string()));
}

// ── Firing ────────────────────────────────────────────────────────────────────

#[test]
fn holding_fire_shoots_once() {
    let (mut game, _clock, mut renderer) = started_game();
    let mut input = ScriptedInput::new()
        .then(&[Ev::Down(Key::Fire)])
        .then(&[Ev::Down(Key::Fire)])
        .then(&[Ev::Down(Key::Fire)]);
    frames(&mut game, &mut input, &mut renderer, 20);
    assert_eq!(game.state().world.shots().count(), 1);

    input.push(&[Ev::Up(Key::Fire), Ev::Down(Key::Fire)]);
    frames(&mut game, &mut input, &mut renderer, 1);
    assert_eq!(game.state().world.shots().count(), 2);
}

#[test]
fn right_mouse_fires_a_pair() {
    let (mut game, _clock, mut renderer) = started_game();
    let mut input = ScriptedInput::new().then(&[Ev::MouseDown(MouseButton::Right)]);
    frames(&mut game, &mut input, &mut renderer, 1);
    assert_eq!(game.state().world.shots().count(), 2);
}

// ── Level and death flow ──────────────────────────────────────────────────────

#[test]
fn clearing_the_wave_starts_the_next_level() {
    let (mut game, _clock, mut renderer) = started_game();
    let (ax, ay) = game
        .state()
        .world
        .aliens()
        .next()
        .map(|a| (a.x(), a.y()))
        .expect("alien");
    game.state_mut().world.spawn_shot(ShotOwner::Player, ax, ay + 5.0);

    frames(&mut game, &mut ScriptedInput::new(), &mut renderer, 1);

    let world = &game.state().world;
    assert_eq!(world.level(), 2);
    assert_eq!(world.alien_count(), 2);
    let aliens: Vec<(f32, f32)> = world.aliens().map(|a| (a.x(), a.y())).collect();
    assert_eq!(aliens, vec![(100.0, 80.0), (150.0, 80.0)]);
    assert!(world.ship().is_some());
    assert_eq!(world.shots().count(), 0);
    assert!(!game.state().input.is_waiting_for_key_press());
    assert_eq!(renderer.last_texts(), vec!["Level 2".to_string()]);
}

#[test]
fn death_returns_to_waiting_with_message() {
    let (mut game, _clock, mut renderer) = started_game();
    let (sx, sy) = game
        .state()
        .world
        .ship()
        .map(|s| (s.x(), s.y()))
        .expect("ship");
    game.state_mut().world.spawn_shot(ShotOwner::Alien, sx, sy);

    frames(&mut game, &mut ScriptedInput::new(), &mut renderer, 1);

    assert!(game.state().input.is_waiting_for_key_press());
    assert!(game.state().world.ship().is_none());
    assert_eq!(
        renderer.last_texts(),
        vec![DEATH_MESSAGE.to_string(), PRESS_ANY_KEY.to_string(), "Level 1".to_string()]
    );

    // Any key restarts the same level with a fresh ship.
    let mut input = ScriptedInput::new().then(&[Ev::Down(Key::Char('r')), Ev::Typed(Key::Char('r'))]);
    frames(&mut game, &mut input, &mut renderer, 1);
    assert!(!game.state().input.is_waiting_for_key_press());
    assert_eq!(game.state().world.level(), 1);
    assert_eq!(ship_x(&game), 370.0);
}

#[test]
fn fire_held_through_death_does_not_restart() {
    let (mut game, _clock, mut renderer) = started_game();
    let mut input = ScriptedInput::new().then(&[Ev::Down(Key::Fire)]);
    frames(&mut game, &mut input, &mut renderer, 1);

    let (sx, sy) = game
        .state()
        .world
        .ship()
        .map(|s| (s.x(), s.y()))
        .expect("ship");
    game.state_mut().world.spawn_shot(ShotOwner::Alien, sx, sy);
    frames(&mut game, &mut input, &mut renderer, 1);
    assert!(game.state().input.is_waiting_for_key_press());

    // The typed half of the held fire press arrives after death.
    input.push(&[Ev::Typed(Key::Fire)]);
    input.push(&[Ev::Up(Key::Fire)]);
    frames(&mut game, &mut input, &mut renderer, 2);
    assert!(game.state().input.is_waiting_for_key_press());
    assert!(game.state().world.ship().is_none());

    input.push(&[Ev::Down(Key::Fire), Ev::Typed(Key::Fire)]);
    frames(&mut game, &mut input, &mut renderer, 1);
    assert!(!game.state().input.is_waiting_for_key_press());
    assert!(game.state().world.ship().is_some());
    assert_eq!(game.state().world.shots().count(), 0);
}

#[test]
fn fps_is_reported_in_the_title() {
    let (mut game, _clock) = new_game(1);
    let mut renderer = RecordingRenderer::default();
    frames(&mut game, &mut ScriptedInput::new(), &mut renderer, 101);
    assert_eq!(renderer.titles, vec!["Space Invaders 102.1 (FPS: 101)".to_string()]);
}

// ── Quitting ──────────────────────────────────────────────────────────────────

#[test]
fn escape_ends_the_run() {
    let (mut game, _clock) = new_game(1);
    let mut renderer = RecordingRenderer::default();
    let mut input = ScriptedInput::new()
        .then(&[Ev::Down(Key::Char('x')), Ev::Typed(Key::Char('x'))])
        .then(&[])
        .then(&[Ev::Typed(Key::Escape)]);

    game.run(&mut input, &mut renderer).expect("clean exit");
    assert!(!game.is_running());
    // The quitting frame is not drawn.
    assert_eq!(renderer.frames.len(), 2);
}

#[test]
fn stop_ends_the_run_before_any_frame() {
    let (mut game, _clock) = new_game(1);
    game.stop();
    let mut renderer = RecordingRenderer::default();
    game.run(&mut ScriptedInput::new(), &mut renderer).expect("clean exit");
    assert!(renderer.frames.is_empty());
}

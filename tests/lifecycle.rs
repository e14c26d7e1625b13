//! Start / stop / reset behaviour through the public API

use avoid_boxes::consts::FRAME_MS;
use avoid_boxes::hooks::RecordingHooks;
use avoid_boxes::sim::{FrameStatus, Game, GamePhase, InputState, ModeKind, RunToken};
use avoid_boxes::GameConfig;

fn game(seed: u64) -> Game<RecordingHooks> {
    Game::new(GameConfig::with_seed(seed), RecordingHooks::default()).unwrap()
}

/// Run frames at 60 Hz until `until` ms or the run ends; returns the last timestamp
fn run(game: &mut Game<RecordingHooks>, token: RunToken, from: f64, until: f64) -> f64 {
    let mut now = from;
    while now < until {
        now += FRAME_MS;
        if !game.frame(token, now, InputState::IDLE).should_continue() {
            break;
        }
    }
    now
}

#[test]
fn reset_all_twice_is_idempotent() {
    let mut game = game(1);
    let token = game.start_meteor_mode(0.0);
    game.grant_invincibility(0.0, 60_000.0);
    run(&mut game, token, 0.0, 8_000.0);
    assert!(game.hazard_count() + game.telegraph_count() > 0);

    game.reset_all();
    let first = (
        game.phase(),
        game.score(),
        game.hazard_count(),
        game.telegraph_count(),
        game.draw_list().commands().to_vec(),
        game.actor().pos,
        game.hooks().last_time().map(str::to_owned),
        game.hooks().last_score(),
    );

    game.reset_all();
    let second = (
        game.phase(),
        game.score(),
        game.hazard_count(),
        game.telegraph_count(),
        game.draw_list().commands().to_vec(),
        game.actor().pos,
        game.hooks().last_time().map(str::to_owned),
        game.hooks().last_score(),
    );

    assert_eq!(first, second);
    assert_eq!(first.0, GamePhase::Idle);
    assert_eq!(first.1, 0);
    assert_eq!(first.2, 0);
    assert_eq!(first.4.len(), 2);
    assert_eq!(first.6.as_deref(), Some("0.0"));
    assert_eq!(first.7, Some(0));
    assert_eq!(game.elapsed_secs(100_000.0), 0.0);
}

#[test]
fn reset_cancels_the_running_driver() {
    let mut game = game(2);
    let token = game.start_leaf_mode(0.0);
    run(&mut game, token, 0.0, 1_000.0);
    game.reset_all();
    assert_eq!(game.frame(token, 1_100.0, InputState::IDLE), FrameStatus::Stale);
    assert_eq!(game.score(), 0);
    assert!(game.hooks().game_overs.is_empty());
}

#[test]
fn starting_a_mode_clears_previous_pools() {
    let mut game = game(3);
    let token = game.start_default_mode(0.0);
    game.grant_invincibility(0.0, 60_000.0);
    run(&mut game, token, 0.0, 3_000.0);
    assert!(game.hazard_count() > 0);

    game.start_up_mode(3_100.0);
    assert_eq!(game.hazard_count(), 0);
    assert_eq!(game.telegraph_count(), 0);
    assert_eq!(game.score(), 0);
    assert_eq!(game.frame(token, 3_116.0, InputState::IDLE), FrameStatus::Stale);
}

#[test]
fn current_mode_survives_reset_and_routes_restart() {
    let mut game = game(4);
    game.start_chaos_mode(0.0);
    game.reset_all();
    assert_eq!(game.current_mode(), ModeKind::Chaos);
    let token = game.restart(500.0);
    assert_eq!(game.phase(), GamePhase::Running);
    assert_eq!(game.current_mode(), ModeKind::Chaos);
    assert!(game.chaos_selection().is_some());
    assert_eq!(game.frame(token, 516.0, InputState::IDLE), FrameStatus::Continue);
}

#[test]
fn game_over_is_reported_exactly_once() {
    for kind in [ModeKind::Default, ModeKind::Up, ModeKind::Meteor, ModeKind::Leaf] {
        let mut game = game(5);
        let token = game.start(kind, 0.0);
        // an idle actor is eventually hit in every mode
        let end = run(&mut game, token, 0.0, 300_000.0);
        assert_eq!(game.phase(), GamePhase::GameOver, "{kind} never ended");
        assert_eq!(game.hooks().game_overs.len(), 1);
        assert_eq!(game.hooks().clock_stops, 1);

        let over = *game.game_over().unwrap();
        assert_eq!(over.mode, kind);
        assert!((over.survival_secs - end / 1000.0).abs() < 1e-9);
        assert_eq!(game.hooks().game_overs[0], over.survival_secs);

        // the stale driver is inert
        for i in 1..10 {
            let status = game.frame(token, end + i as f64 * FRAME_MS, InputState::IDLE);
            assert_eq!(status, FrameStatus::Stale);
        }
        assert_eq!(game.hooks().game_overs.len(), 1);

        let summary = game.summary(end + 10_000.0);
        assert_eq!(summary.hazard, Some(over.hazard));
        assert_eq!(summary.survival_secs, over.survival_secs);
    }
}

#[test]
fn stalled_host_does_not_teleport_hazards() {
    let mut game = game(6);
    let token = game.start_default_mode(0.0);
    game.grant_invincibility(0.0, 600_000.0);
    let now = run(&mut game, token, 0.0, 2_000.0);
    let before = game.hazard_boxes();
    assert!(!before.is_empty());

    // five seconds with no frames
    game.frame(token, now + 5_000.0, InputState::IDLE);
    let after = game.hazard_boxes();
    for (a, b) in before.iter().zip(after.iter()) {
        // Default boxes fall at most 4 units per nominal frame, capped at 6 frames
        assert!(b.pos.y - a.pos.y <= 4.0 * 6.0 + 1e-3);
    }
    // wall-clock timers still catch up
    assert_eq!(game.score_totals().auto_points, ((now + 5_000.0) / 500.0).floor() as u64);
}

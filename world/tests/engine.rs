use number_rush_core::{
    Command, Event, GamePhase, Gold, Level, NextTarget, PowerUp, PowerUpRejection, SaveSnapshot,
    TimerStartPolicy, HINT_COST, HINT_HIGHLIGHT, MAX_LEVEL, TIME_COST, TIME_EXTENSION, TIME_LIMIT,
};
use number_rush_system_sequence::RoundShape;
use number_rush_system_timer::TimerState;
use number_rush_world::{self as world, query, Config, World};

fn world_with(policy: TimerStartPolicy, count: u32, max: u32) -> World {
    let shape = RoundShape::new(count, max).expect("valid shape");
    World::new(Config::new(policy, 0x1234_5678).with_shape(shape))
}

fn restore(world: &mut World, level: u32, gold: u32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::RestoreProgress {
            snapshot: SaveSnapshot::new(Level::clamped(level), Gold::new(gold), Gold::ZERO),
        },
        &mut events,
    );
    events
}

fn click(world: &mut World, value: u32) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::ClickCell { value }, &mut events);
    events
}

fn tick(world: &mut World, times: u32) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..times {
        world::apply(world, Command::Tick, &mut events);
    }
    events
}

fn clear_board(world: &mut World) -> Vec<Event> {
    let targets = query::target_sequence(world).to_vec();
    let mut events = Vec::new();
    for value in targets {
        events.extend(click(world, value));
    }
    events
}

#[test]
fn restore_announces_a_fresh_board() {
    let mut world = world_with(TimerStartPolicy::OnFirstMatch, 4, 9);
    let events = restore(&mut world, 3, 12);

    let Some(Event::RoundStarted {
        level,
        display_order,
        next_target,
    }) = events
        .iter()
        .find(|event| matches!(event, Event::RoundStarted { .. }))
    else {
        panic!("expected a round announcement: {events:?}");
    };

    assert_eq!(level.get(), 3);
    assert_eq!(display_order.len(), 4);
    assert_eq!(
        *next_target,
        NextTarget::Value(query::target_sequence(&world)[0])
    );
    assert_eq!(events.last(), Some(&Event::PersistRequested));
}

#[test]
fn cursor_advances_only_on_exact_match() {
    let mut world = world_with(TimerStartPolicy::OnFirstMatch, 5, 50);
    let _ = restore(&mut world, 1, 0);
    let targets = query::target_sequence(&world).to_vec();

    let wrong = targets[1];
    assert!(click(&mut world, wrong).is_empty());
    assert!(click(&mut world, 0).is_empty());
    assert!(click(&mut world, 51).is_empty());
    assert_eq!(query::cursor(&world), 0);

    let events = click(&mut world, targets[0]);
    assert_eq!(query::cursor(&world), 1);
    assert_eq!(
        events[..2],
        [
            Event::CellConsumed { value: targets[0] },
            Event::NextTargetChanged {
                next: NextTarget::Value(targets[1])
            },
        ]
    );
}

#[test]
fn clicking_a_consumed_value_is_a_no_op() {
    let mut world = world_with(TimerStartPolicy::OnFirstMatch, 3, 10);
    let _ = restore(&mut world, 1, 0);
    let targets = query::target_sequence(&world).to_vec();

    let _ = click(&mut world, targets[0]);
    let _ = click(&mut world, targets[1]);
    assert!(query::is_consumed(&world, targets[0]));

    for _ in 0..3 {
        assert!(click(&mut world, targets[0]).is_empty());
        assert!(click(&mut world, targets[1]).is_empty());
    }
    assert_eq!(query::cursor(&world), 2);

    let completion = click(&mut world, targets[2]);
    let rewards = completion
        .iter()
        .filter(|event| matches!(event, Event::LevelCompleted { .. }))
        .count();
    assert_eq!(rewards, 1);

    assert!(click(&mut world, targets[2]).is_empty());
    assert_eq!(query::gold(&world), Gold::new(25));
}

#[test]
fn correct_click_refills_the_countdown() {
    let mut world = world_with(TimerStartPolicy::Immediate, 3, 10);
    let _ = restore(&mut world, 1, 0);
    let _ = tick(&mut world, 7);
    assert_eq!(query::remaining_seconds(&world), TIME_LIMIT - 7);

    let first = query::target_sequence(&world)[0];
    let events = click(&mut world, first);
    assert_eq!(query::remaining_seconds(&world), TIME_LIMIT);
    assert!(events.contains(&Event::TimerStarted {
        remaining: TIME_LIMIT
    }));
}

#[test]
fn reward_scales_with_remaining_seconds() {
    let mut world = world_with(TimerStartPolicy::Immediate, 1, 1);
    let _ = restore(&mut world, 1, 0);
    let _ = tick(&mut world, TIME_LIMIT - 24);
    assert_eq!(query::remaining_seconds(&world), 24);

    let events = click(&mut world, 1);
    assert!(events.contains(&Event::LevelCompleted {
        level: Level::FIRST,
        reward: Gold::new(22),
    }));
    assert_eq!(query::gold(&world), Gold::new(22));
    assert_eq!(query::high_score(&world), Gold::new(22));
    assert_eq!(query::phase(&world), GamePhase::LevelComplete);
    assert_eq!(query::timer_state(&world), TimerState::Stopped);
    assert_eq!(events.last(), Some(&Event::PersistRequested));
}

#[test]
fn completed_level_waits_for_advance() {
    let mut world = world_with(TimerStartPolicy::OnFirstMatch, 2, 4);
    let _ = restore(&mut world, 1, 0);
    let _ = clear_board(&mut world);
    assert_eq!(query::phase(&world), GamePhase::LevelComplete);

    assert!(tick(&mut world, 40).is_empty());
    assert!(click(&mut world, 1).is_empty());

    let mut events = Vec::new();
    world::apply(&mut world, Command::AdvanceLevel, &mut events);
    assert_eq!(query::level(&world).get(), 2);
    assert_eq!(query::phase(&world), GamePhase::LevelInProgress);
    assert_eq!(query::cursor(&world), 0);
    assert_eq!(events.last(), Some(&Event::PersistRequested));
}

#[test]
fn clearing_the_final_level_wins_the_game() {
    let mut world = world_with(TimerStartPolicy::OnFirstMatch, 2, 6);
    let _ = restore(&mut world, MAX_LEVEL, 5);
    let events = clear_board(&mut world);

    assert_eq!(query::phase(&world), GamePhase::GameWon);
    assert!(events.contains(&Event::GameWon {
        gold: Gold::new(5 + 25)
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::LevelCompleted { .. })));

    let mut advance = Vec::new();
    world::apply(&mut world, Command::AdvanceLevel, &mut advance);
    assert!(advance.is_empty(), "won game is terminal until reset");
    assert_eq!(query::level(&world), Level::FINAL);
}

#[test]
fn full_run_walks_every_level() {
    let mut world = world_with(TimerStartPolicy::OnFirstMatch, 3, 12);
    let _ = restore(&mut world, 1, 0);

    for level in 1..=MAX_LEVEL {
        assert_eq!(query::level(&world).get(), level);
        let _ = clear_board(&mut world);
        if level < MAX_LEVEL {
            assert_eq!(query::phase(&world), GamePhase::LevelComplete);
            let mut events = Vec::new();
            world::apply(&mut world, Command::AdvanceLevel, &mut events);
        }
    }

    assert_eq!(query::phase(&world), GamePhase::GameWon);
    assert_eq!(query::gold(&world), Gold::new(25 * MAX_LEVEL));
}

#[test]
fn expiry_ends_the_run_and_reset_halves_gold() {
    let mut world = world_with(TimerStartPolicy::Immediate, 4, 20);
    let _ = restore(&mut world, 6, 51);

    let events = tick(&mut world, TIME_LIMIT);
    assert_eq!(query::phase(&world), GamePhase::GameOver);
    let expirations = events
        .iter()
        .filter(|event| **event == Event::TimerExpired)
        .count();
    assert_eq!(expirations, 1);
    assert!(events.contains(&Event::GameOver {
        level: Level::clamped(6),
        gold: Gold::new(51),
    }));

    assert!(tick(&mut world, 5).is_empty(), "expired countdown stays silent");
    let first = query::target_sequence(&world)[0];
    assert!(click(&mut world, first).is_empty());

    let mut reset = Vec::new();
    world::apply(&mut world, Command::ResetGame, &mut reset);
    assert_eq!(query::gold(&world), Gold::new(25));
    assert_eq!(query::level(&world), Level::FIRST);
    assert_eq!(query::phase(&world), GamePhase::LevelInProgress);
    assert_eq!(query::cursor(&world), 0);
    assert!(reset.contains(&Event::GameReset {
        gold: Gold::new(25)
    }));
}

#[test]
fn reset_cannot_dodge_the_expiry_penalty() {
    let mut world = world_with(TimerStartPolicy::Immediate, 4, 20);
    let _ = restore(&mut world, 6, 51);
    let _ = tick(&mut world, TIME_LIMIT - 1);
    assert_eq!(query::remaining_seconds(&world), 1);

    let mut ignored = Vec::new();
    world::apply(&mut world, Command::ResetGame, &mut ignored);
    assert!(ignored.is_empty(), "reset mid-level must be ignored: {ignored:?}");
    assert_eq!(query::gold(&world), Gold::new(51));
    assert_eq!(query::level(&world), Level::clamped(6));
    assert_eq!(query::remaining_seconds(&world), 1);

    let _ = tick(&mut world, 1);
    assert_eq!(query::phase(&world), GamePhase::GameOver);
    let mut reset = Vec::new();
    world::apply(&mut world, Command::ResetGame, &mut reset);
    assert_eq!(query::gold(&world), Gold::new(25));
    assert_eq!(query::level(&world), Level::FIRST);
}

#[test]
fn reset_is_ignored_while_awaiting_the_next_level() {
    let mut world = world_with(TimerStartPolicy::OnFirstMatch, 3, 9);
    let _ = restore(&mut world, 2, 7);
    let _ = clear_board(&mut world);
    assert_eq!(query::phase(&world), GamePhase::LevelComplete);
    let gold = query::gold(&world);

    let mut events = Vec::new();
    world::apply(&mut world, Command::ResetGame, &mut events);
    assert!(events.is_empty());
    assert_eq!(query::phase(&world), GamePhase::LevelComplete);
    assert_eq!(query::level(&world), Level::clamped(2));
    assert_eq!(query::gold(&world), gold);
}

#[test]
fn reset_after_winning_keeps_gold() {
    let mut world = world_with(TimerStartPolicy::OnFirstMatch, 1, 3);
    let _ = restore(&mut world, MAX_LEVEL, 40);
    let _ = clear_board(&mut world);
    let won_with = query::gold(&world);

    let mut events = Vec::new();
    world::apply(&mut world, Command::ResetGame, &mut events);
    assert_eq!(query::gold(&world), won_with);
    assert_eq!(query::level(&world), Level::FIRST);
}

#[test]
fn hint_reveals_next_target_and_charges_gold() {
    let mut world = world_with(TimerStartPolicy::OnFirstMatch, 4, 30);
    let _ = restore(&mut world, 2, HINT_COST + 5);
    let expected = query::target_sequence(&world)[0];

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::UsePowerUp {
            kind: PowerUp::Hint,
        },
        &mut events,
    );

    assert_eq!(query::gold(&world), Gold::new(5));
    assert_eq!(
        events,
        vec![
            Event::GoldChanged { gold: Gold::new(5) },
            Event::HintRevealed {
                value: expected,
                duration: HINT_HIGHLIGHT,
            },
            Event::PersistRequested,
        ]
    );
    assert_eq!(query::cursor(&world), 0, "hints never consume cells");
}

#[test]
fn unaffordable_power_up_changes_nothing() {
    let mut world = world_with(TimerStartPolicy::Immediate, 4, 30);
    let _ = restore(&mut world, 1, HINT_COST - 1);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::UsePowerUp {
            kind: PowerUp::Hint,
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::PowerUpRejected {
            kind: PowerUp::Hint,
            reason: PowerUpRejection::Unaffordable,
        }]
    );
    assert_eq!(query::gold(&world), Gold::new(HINT_COST - 1));
}

#[test]
fn extend_requires_a_running_countdown() {
    let mut world = world_with(TimerStartPolicy::OnFirstMatch, 4, 30);
    let _ = restore(&mut world, 1, 100);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::UsePowerUp {
            kind: PowerUp::ExtendTime,
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::PowerUpRejected {
            kind: PowerUp::ExtendTime,
            reason: PowerUpRejection::TimerNotRunning,
        }]
    );
    assert_eq!(query::gold(&world), Gold::new(100));

    let first = query::target_sequence(&world)[0];
    let _ = click(&mut world, first);
    let _ = tick(&mut world, 4);

    let mut extended = Vec::new();
    world::apply(
        &mut world,
        Command::UsePowerUp {
            kind: PowerUp::ExtendTime,
        },
        &mut extended,
    );
    assert_eq!(query::gold(&world), Gold::new(100 - TIME_COST));
    assert_eq!(
        query::remaining_seconds(&world),
        TIME_LIMIT - 4 + TIME_EXTENSION
    );
    assert!(extended.contains(&Event::TimerExtended {
        remaining: TIME_LIMIT - 4 + TIME_EXTENSION
    }));
}

#[test]
fn power_ups_are_refused_outside_a_running_level() {
    let mut world = world_with(TimerStartPolicy::OnFirstMatch, 1, 2);
    let _ = restore(&mut world, 1, 100);
    let _ = clear_board(&mut world);
    let gold = query::gold(&world);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::UsePowerUp {
            kind: PowerUp::Hint,
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::PowerUpRejected {
            kind: PowerUp::Hint,
            reason: PowerUpRejection::NotInProgress,
        }]
    );
    assert_eq!(query::gold(&world), gold);
}

#[test]
fn same_seed_replays_identically() {
    fn replay() -> (Vec<Event>, SaveSnapshot) {
        let mut world = world_with(TimerStartPolicy::Immediate, 6, 40);
        let mut log = restore(&mut world, 1, 0);
        log.extend(clear_board(&mut world));
        let mut events = Vec::new();
        world::apply(&mut world, Command::AdvanceLevel, &mut events);
        log.extend(events);
        log.extend(tick(&mut world, 3));
        (log, query::snapshot(&world))
    }

    assert_eq!(replay(), replay());
}

//! Integration tests for the alarm lifecycle across the three trigger paths.

use chrono::Duration;
use naptime_core::sim::{ManualClock, RecordingPlayer, RecordingScheduler};
use naptime_core::{
    AlarmPhase, AlarmSoundCoordinator, CountdownEngine, Event, HostEvent,
    NotificationLifecycleBridge, Presentation, SoundState, SoundTrigger, ALARM_NOTIFICATION_ID,
};

struct Harness {
    bridge: NotificationLifecycleBridge<RecordingScheduler, RecordingPlayer, ManualClock>,
    clock: ManualClock,
    scheduler: RecordingScheduler,
    player: RecordingPlayer,
}

fn harness() -> Harness {
    let clock = ManualClock::default();
    let scheduler = RecordingScheduler::default();
    let player = RecordingPlayer::default();
    let bridge = NotificationLifecycleBridge::new(
        CountdownEngine::new(scheduler.clone(), clock.clone()),
        AlarmSoundCoordinator::new(player.clone()),
    );
    Harness {
        bridge,
        clock,
        scheduler,
        player,
    }
}

fn delivered() -> HostEvent {
    HostEvent::NotificationDelivered {
        identifier: ALARM_NOTIFICATION_ID.into(),
    }
}

fn tapped() -> HostEvent {
    HostEvent::NotificationTapped {
        identifier: ALARM_NOTIFICATION_ID.into(),
    }
}

#[test]
fn scenario_a_ten_seconds_into_ten_minutes() {
    let mut h = harness();
    h.bridge.start(600).unwrap();
    h.clock.advance_secs(10);

    let out = h.bridge.dispatch(HostEvent::Tick);
    match out.events.as_slice() {
        [Event::CountdownTick { remaining_secs, .. }] => {
            assert!((589..=591).contains(remaining_secs), "got {remaining_secs}");
        }
        other => panic!("Expected CountdownTick, got {other:?}"),
    }
    assert_eq!(h.bridge.phase(), AlarmPhase::CountingDown);
    assert_eq!(h.bridge.view().remaining_secs, Some(590));
}

#[test]
fn scenario_b_tick_path_fires_and_plays_once() {
    let mut h = harness();
    h.bridge.start(5).unwrap();
    h.clock.advance_secs(6);

    let out = h.bridge.dispatch(HostEvent::Tick);
    assert!(out
        .events
        .iter()
        .any(|e| matches!(e, Event::SoundStarted { trigger: SoundTrigger::LocalFire, .. })));
    assert_eq!(h.bridge.phase(), AlarmPhase::Fired);
    assert_eq!(h.player.play_calls(), 1);

    for _ in 0..5 {
        h.clock.advance_secs(1);
        assert!(h.bridge.dispatch(HostEvent::Tick).events.is_empty());
    }
    assert_eq!(h.player.play_calls(), 1);
}

#[test]
fn scenario_c_foreground_delivery_before_local_zero() {
    let mut h = harness();
    h.bridge.start(5).unwrap();
    h.clock.advance(Duration::milliseconds(4_800));

    let out = h.bridge.dispatch(delivered());
    assert_eq!(out.presentation, Some(Presentation::Suppress));
    assert_eq!(h.player.play_calls(), 1);
    assert_eq!(h.bridge.sound_state(), SoundState::Playing);

    h.clock.advance(Duration::milliseconds(200));
    h.bridge.dispatch(HostEvent::Tick);
    h.clock.advance_secs(1);
    h.bridge.dispatch(HostEvent::Tick);
    assert_eq!(h.player.play_calls(), 1);
    assert_eq!(h.bridge.phase(), AlarmPhase::Fired);
}

#[test]
fn scenario_d_background_tap_never_plays() {
    let mut h = harness();
    h.bridge.start(5).unwrap();
    h.clock.advance_secs(7);

    h.bridge.dispatch(tapped());
    assert_eq!(h.bridge.phase(), AlarmPhase::Idle);
    assert_eq!(h.bridge.remaining_secs(), None);
    assert_eq!(h.player.play_calls(), 0);

    // The UI timer resumes after the app is foregrounded.
    h.bridge.dispatch(HostEvent::Tick);
    assert_eq!(h.player.play_calls(), 0);
}

#[test]
fn local_fire_then_late_foreground_delivery() {
    let mut h = harness();
    h.bridge.start(5).unwrap();
    h.clock.advance_secs(5);
    h.bridge.dispatch(HostEvent::Tick);

    let out = h.bridge.dispatch(delivered());
    assert_eq!(out.presentation, Some(Presentation::Suppress));
    assert!(out.events.is_empty());
    assert_eq!(h.player.play_calls(), 1);
}

#[test]
fn suspended_host_catches_up_on_first_tick() {
    let mut h = harness();
    h.bridge.start(600).unwrap();
    h.clock.advance_secs(3_600);

    let out = h.bridge.dispatch(HostEvent::Tick);
    assert!(matches!(out.events[0], Event::AlarmFired { .. }));
    assert_eq!(h.player.play_calls(), 1);
}

#[test]
fn dismiss_while_ringing_then_reschedule() {
    let mut h = harness();
    h.bridge.start(5).unwrap();
    h.clock.advance_secs(5);
    h.bridge.dispatch(HostEvent::Tick);

    let stopped = h.bridge.stop().unwrap();
    assert!(matches!(
        stopped,
        Event::AlarmStopped {
            phase: AlarmPhase::Fired,
            sound_was_playing: true,
            ..
        }
    ));
    assert_eq!(h.player.stop_calls(), 1);
    assert!(!h.player.is_playing());
    assert!(!h.bridge.is_sound_handled());

    h.bridge.start(780).unwrap();
    h.clock.advance_secs(780);
    h.bridge.dispatch(HostEvent::Tick);
    assert_eq!(h.player.play_calls(), 2);
    assert_eq!(
        h.scheduler.scheduled().iter().map(|r| r.after_secs).collect::<Vec<_>>(),
        vec![5, 780]
    );
}

#[test]
fn stale_delivery_after_stop_is_silent() {
    let mut h = harness();
    h.bridge.start(5).unwrap();
    h.bridge.stop();

    let out = h.bridge.dispatch(delivered());
    assert_eq!(out.presentation, Some(Presentation::Suppress));
    assert!(out.events.is_empty());
    assert_eq!(h.player.play_calls(), 0);
    assert_eq!(h.bridge.phase(), AlarmPhase::Idle);
}

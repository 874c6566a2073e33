use std::str::FromStr;

use clap::Args;
use naptime_core::sim::{ManualClock, RecordingPlayer, RecordingScheduler};
use naptime_core::{
    AlarmPhase, AlarmSoundCoordinator, Config, CountdownEngine, Event, HostEvent,
    NotificationLifecycleBridge, SchedulingError, SoundError,
};
use serde::Serialize;

use super::DurationArgs;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub duration: DurationArgs,
    /// Comma-separated steps: advance:N, tick, deliver, deliver-other, tap, stop
    #[arg(long, default_value = "")]
    pub script: String,
    /// Make every play() fail
    #[arg(long)]
    pub fail_sound: bool,
    /// Make scheduling fail
    #[arg(long)]
    pub deny_notifications: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SimStep {
    Advance(i64),
    Tick,
    Deliver,
    DeliverOther,
    Tap,
    Stop,
}

impl FromStr for SimStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(secs) = s.strip_prefix("advance:") {
            let secs = secs
                .parse::<i64>()
                .map_err(|_| format!("invalid advance: {s}"))?;
            if secs < 0 {
                return Err(format!("clock cannot go backwards: {s}"));
            }
            return Ok(SimStep::Advance(secs));
        }
        match s {
            "tick" => Ok(SimStep::Tick),
            "deliver" => Ok(SimStep::Deliver),
            "deliver-other" => Ok(SimStep::DeliverOther),
            "tap" => Ok(SimStep::Tap),
            "stop" => Ok(SimStep::Stop),
            other => Err(format!("unknown script step: {other}")),
        }
    }
}

fn parse_script(script: &str) -> Result<Vec<SimStep>, String> {
    script
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(SimStep::from_str)
        .collect()
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    events: Vec<Event>,
    phase: AlarmPhase,
    remaining_secs: Option<u64>,
    play_calls: usize,
    stop_calls: usize,
    notifications_scheduled: usize,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let seconds = args.duration.resolve(&config.presets)?;
    let steps = parse_script(&args.script)?;

    let clock = ManualClock::default();
    let scheduler = RecordingScheduler::default();
    let player = RecordingPlayer::default();
    if args.deny_notifications {
        scheduler.fail_with(SchedulingError::PermissionDenied);
    }
    if args.fail_sound {
        player.fail_with(SoundError::ResourceMissing(config.alarm.sound_file.clone()));
    }

    let engine = CountdownEngine::with_notification(
        scheduler.clone(),
        clock.clone(),
        config.notification_request(0),
    );
    let mut bridge =
        NotificationLifecycleBridge::new(engine, AlarmSoundCoordinator::new(player.clone()));

    let mut events = bridge.start(seconds)?;
    let alarm_id = config.alarm.notification_id.clone();

    for step in steps {
        match step {
            SimStep::Advance(secs) => {
                clock
                    .advance_secs(secs)
                    .ok_or_else(|| format!("advance:{secs} is out of the clock's range"))?;
            }
            SimStep::Tick => events.extend(bridge.dispatch(HostEvent::Tick).events),
            SimStep::Deliver => events.extend(
                bridge
                    .dispatch(HostEvent::NotificationDelivered {
                        identifier: alarm_id.clone(),
                    })
                    .events,
            ),
            SimStep::DeliverOther => events.extend(
                bridge
                    .dispatch(HostEvent::NotificationDelivered {
                        identifier: "otherNotification".into(),
                    })
                    .events,
            ),
            SimStep::Tap => events.extend(
                bridge
                    .dispatch(HostEvent::NotificationTapped {
                        identifier: alarm_id.clone(),
                    })
                    .events,
            ),
            SimStep::Stop => events.extend(bridge.stop()),
        }
    }

    let report = SimulationReport {
        events,
        phase: bridge.phase(),
        remaining_secs: bridge.remaining_secs(),
        play_calls: player.play_calls(),
        stop_calls: player.stop_calls(),
        notifications_scheduled: scheduler.scheduled().len(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

use std::path::PathBuf;

use clap::Args;
use naptime_core::{
    AlarmPhase, AlarmSoundCoordinator, Config, CountdownEngine, HostEvent,
    NotificationLifecycleBridge, NotificationRequest, SystemClock,
};
use tokio::time::{sleep_until, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::{emit, emit_all, DurationArgs};
use crate::host::{TerminalBell, TerminalScheduler};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub duration: DurationArgs,
    /// Behave as if the app were in the background: no countdown ticks, the
    /// notification is presented with its own sound and then tapped.
    #[arg(long)]
    pub background: bool,
    /// Sound file that must exist for the alarm to ring
    #[arg(long)]
    pub sound: Option<PathBuf>,
    /// Dismiss automatically after ringing this many seconds
    #[arg(long)]
    pub ring_for: Option<u64>,
    /// Act as if notification permission was revoked
    #[arg(long)]
    pub deny_notifications: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let seconds = args.duration.resolve(&config.presets)?;

    if config.reminders.silent_mode_warning {
        eprintln!(
            "Reminder: make sure your device is not on Silent Mode or Do Not Disturb, \
             otherwise the alarm will NOT sound."
        );
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_alarm(&config, seconds, &args))?;

    if config.reminders.restore_reminder {
        eprintln!("You can now re-enable Silent Mode or Do Not Disturb if you'd like.");
    }
    Ok(())
}

async fn run_alarm(
    config: &Config,
    seconds: i64,
    args: &RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = TerminalScheduler::new(!args.deny_notifications);
    let bell = TerminalBell::new(args.sound.clone());
    let engine = CountdownEngine::with_notification(
        scheduler.clone(),
        SystemClock,
        config.notification_request(0),
    );
    let mut bridge =
        NotificationLifecycleBridge::new(engine, AlarmSoundCoordinator::new(bell.clone()));

    emit_all(&bridge.start(seconds)?)?;

    let mut ticker = tokio::time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let ring_limit = args.ring_for.map(Duration::from_secs);
    let mut ringing_since: Option<Instant> = None;

    loop {
        let due = scheduler.due_at();
        tokio::select! {
            _ = ticker.tick(), if !args.background => {
                let out = bridge.dispatch(HostEvent::Tick);
                emit_all(&out.events)?;
                if bell.is_ringing() {
                    bell.ring();
                }
            }
            _ = wait_until(due) => {
                let Some(request) = scheduler.take_due() else { continue };
                let out = if args.background {
                    present(&request);
                    bridge.dispatch(HostEvent::NotificationTapped { identifier: request.id })
                } else {
                    bridge.dispatch(HostEvent::NotificationDelivered { identifier: request.id })
                };
                debug!(presentation = ?out.presentation, "notification delivered");
                emit_all(&out.events)?;
            }
            _ = &mut ctrl_c => {
                info!("dismissed");
                if let Some(event) = bridge.stop() {
                    emit(&event)?;
                }
                break;
            }
        }

        if bridge.phase() == AlarmPhase::Idle {
            break;
        }
        if bell.is_ringing() {
            let since = *ringing_since.get_or_insert_with(Instant::now);
            if ring_limit.is_some_and(|limit| since.elapsed() >= limit) {
                if let Some(event) = bridge.stop() {
                    emit(&event)?;
                }
                break;
            }
        }
    }

    Ok(())
}

async fn wait_until(due: Option<Instant>) {
    match due {
        Some(due) => sleep_until(due).await,
        None => std::future::pending().await,
    }
}

/// What the OS shows for a notification that arrives in the background.
fn present(request: &NotificationRequest) {
    eprintln!("🔔 {}: {}", request.title, request.body);
    if request.sound.is_some() {
        // One-shot notification sound.
        eprint!("\x07");
    }
}

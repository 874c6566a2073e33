pub mod config;
pub mod presets;
pub mod run;
pub mod simulate;

use clap::Args;
use naptime_core::presets::find as find_preset;
use naptime_core::{Event, Preset};

/// How long until the alarm rings. Exactly one is required.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct DurationArgs {
    /// Preset label or minutes, e.g. "20 minutes", "20m"
    #[arg(long)]
    pub preset: Option<String>,
    /// Minutes from now
    #[arg(long)]
    pub minutes: Option<i64>,
    /// Seconds from now
    #[arg(long, allow_negative_numbers = true)]
    pub seconds: Option<i64>,
}

impl DurationArgs {
    /// Duration in seconds. Non-positive values are passed through so the
    /// core reports them as invalid.
    pub fn resolve(&self, available: &[Preset]) -> Result<i64, Box<dyn std::error::Error>> {
        if let Some(query) = &self.preset {
            let preset = find_preset(available, query)
                .ok_or_else(|| format!("unknown preset: {query}"))?;
            return Ok(i64::try_from(preset.seconds)?);
        }
        if let Some(minutes) = self.minutes {
            return minutes
                .checked_mul(60)
                .ok_or_else(|| format!("duration too large: {minutes} minutes").into());
        }
        self.seconds.ok_or_else(|| "no duration given".into())
    }
}

/// One event per line, compact JSON.
pub fn emit(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

pub fn emit_all<'a>(events: impl IntoIterator<Item = &'a Event>) -> Result<(), serde_json::Error> {
    for event in events {
        emit(event)?;
    }
    Ok(())
}

use serde::{Deserialize, Serialize};

/// A selectable alarm delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub label: String,
    pub seconds: u64,
}

impl Preset {
    pub fn minutes(minutes: u64) -> Self {
        Self {
            label: format!("{minutes} minutes"),
            seconds: minutes.saturating_mul(60),
        }
    }
}

/// The nap lengths offered out of the box.
pub fn default_presets() -> Vec<Preset> {
    [10, 13, 15, 20, 23, 25, 45, 60]
        .into_iter()
        .map(Preset::minutes)
        .collect()
}

/// Find a preset by label ("20 minutes"), bare minutes ("20") or a
/// minute suffix ("20m", "20min"). Case-insensitive.
pub fn find<'a>(presets: &'a [Preset], query: &str) -> Option<&'a Preset> {
    let query = query.trim();
    if let Some(p) = presets.iter().find(|p| p.label.eq_ignore_ascii_case(query)) {
        return Some(p);
    }

    let lower = query.to_ascii_lowercase();
    let digits = lower
        .strip_suffix("minutes")
        .or_else(|| lower.strip_suffix("min"))
        .or_else(|| lower.strip_suffix('m'))
        .unwrap_or(&lower)
        .trim();
    let seconds = digits.parse::<u64>().ok()?.checked_mul(60)?;
    presets.iter().find(|p| p.seconds == seconds)
}

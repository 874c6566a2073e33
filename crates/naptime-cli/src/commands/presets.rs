use naptime_core::Config;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    if json {
        println!("{}", serde_json::to_string_pretty(&config.presets)?);
        return Ok(());
    }
    for preset in &config.presets {
        println!("{:<12} {:>5}s", preset.label, preset.seconds);
    }
    Ok(())
}

use wellwater::{pipelines, WellWaterConfig, WellWaterError};

fn main() -> Result<(), WellWaterError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = WellWaterConfig::from_working_dir()?;
    let placed = pipelines::location_map(&config)?;
    println!("Map with {} wells saved to {}", placed.height(), config.map_html.display());
    Ok(())
}

use wellwater::{pipelines, WellWaterConfig, WellWaterError};

fn main() -> Result<(), WellWaterError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = WellWaterConfig::from_working_dir()?;
    let series = pipelines::overall_monthly_chart(&config)?;
    println!("{}", series);
    Ok(())
}

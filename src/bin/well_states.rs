use log::warn;
use wellwater::{
    pipelines, CachedGeocoder, GoogleGeocoder, WellWaterConfig, WellWaterError, API_KEY_ENV_VAR,
    COL_STATE,
};

fn main() -> Result<(), WellWaterError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = WellWaterConfig::from_working_dir()?;
    let api_key = config.geocoder.resolved_api_key();
    if api_key.is_empty() {
        warn!(
            "No geocoder API key configured (set [geocoder] api_key or {}), lookups will fail",
            API_KEY_ENV_VAR
        );
    }
    let google = GoogleGeocoder::with_endpoint(api_key, config.geocoder.endpoint.clone());

    let states = if config.geocoder.cache {
        let cached = CachedGeocoder::new(google)?;
        let states = pipelines::well_states(&config, &cached)?;
        cached.save()?;
        states
    } else {
        pipelines::well_states(&config, &google)?
    };

    let found = states
        .text_values(COL_STATE)?
        .iter()
        .filter(|state| state.is_some())
        .count();
    println!("Found a state for {} of {} wells", found, states.height());
    Ok(())
}

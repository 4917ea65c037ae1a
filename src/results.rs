use crate::config::Config;
use crate::session::{with_retry, FetchError, Session};
use crate::types::VehicleType;
use url::Url;

/// GETs the results page for a plate and returns the raw markup.
pub async fn fetch_results(
    session: &dyn Session,
    plate: &str,
    vehicle: VehicleType,
    config: &Config,
) -> Result<String, FetchError> {
    let url = Url::parse_with_params(
        &config.results_url,
        &[("LoaiXe", vehicle.code()), ("BienKiemSoat", plate)],
    )
    .map_err(|e| FetchError::Other(format!("invalid results URL: {}", e)))?;
    with_retry(
        "results request",
        config.stage_retries,
        config.retry_delay,
        || session.get_text(url.as_str()),
    )
    .await
}

use crate::config::Config;
use crate::session::{with_retry, FetchError, Session};
use crate::types::VehicleType;

// Fixed fields the upstream form requires alongside the real data.
const CLIENT_IP: &str = "9.9.9.91";
const CONFIRM_FLAG: &str = "1";

/// POSTs the lookup form and returns the raw response body. Whether the
/// site accepted the captcha is for the caller to decide.
pub async fn submit_form(
    session: &dyn Session,
    plate: &str,
    captcha: &str,
    vehicle: VehicleType,
    config: &Config,
) -> Result<String, FetchError> {
    let url = format!("{}{}", config.base_url, config.form_endpoint);
    let form = [
        ("BienKS", plate),
        ("Xe", vehicle.code()),
        ("captcha", captcha),
        ("ipClient", CLIENT_IP),
        ("cUrl", CONFIRM_FLAG),
    ];
    with_retry(
        "form submission",
        config.stage_retries,
        config.retry_delay,
        || session.post_form(&url, &form),
    )
    .await
}

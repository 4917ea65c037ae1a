use std::env;
use std::time::Duration;

/// Process-wide read-only settings for the lookup pipeline. Everything here
/// mirrors the upstream site's contract; only the listen port is expected to
/// vary between deployments.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub captcha_path: String,
    pub form_endpoint: String,
    pub results_url: String,
    pub user_agent: String,
    pub accept: String,
    pub timeout: Duration,
    /// Top-level pipeline restarts after the initial attempt.
    pub max_retries: u32,
    /// Retries within a single sub-stage (captcha fetch, submit, results).
    /// Independent of `max_retries`; reset on every pipeline restart.
    pub stage_retries: u32,
    pub retry_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: "https://www.csgt.vn".to_string(),
            captcha_path: "/lib/captcha/captcha.class.php".to_string(),
            form_endpoint: "/?mod=contact&task=tracuu_post&ajax".to_string(),
            results_url: "https://www.csgt.vn/tra-cuu-phuong-tien-vi-pham.html".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 5,
            stage_retries: 3,
            retry_delay: Duration::from_secs(2),
        }
    }
}

pub fn listen_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5001)
}

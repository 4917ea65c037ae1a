use crate::captcha::{fetch_captcha, CaptchaSolver};
use crate::config::Config;
use crate::extract::ViolationExtractor;
use crate::results::fetch_results;
use crate::session::{FetchError, SessionProvider};
use crate::submit::submit_form;
use crate::types::{LookupError, Outcome, VehicleType, Violation};
use log::{error, info, warn};
use serde_json::Value;
use tokio::time::delay_for;

/// The upstream form endpoint signals a failed captcha by returning the
/// JSON number 404 as the response body. An in-band value, not a status
/// code; nothing else in the pipeline inspects the body shape.
fn is_rejection(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .map(|v| v == Value::from(404))
        .unwrap_or(false)
}

/// Why a single attempt did not produce a result.
enum AttemptError {
    /// Captcha rejected by the site; restart with a fresh session.
    Rejected,
    /// A sub-stage exhausted its local retry budget on transient failures.
    Transient(String),
    /// Not worth retrying at all.
    Fatal(String),
}

impl From<FetchError> for AttemptError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Transient(msg) => AttemptError::Transient(msg),
            FetchError::Other(msg) => AttemptError::Fatal(msg),
        }
    }
}

pub struct Lookup {
    config: Config,
    sessions: Box<dyn SessionProvider>,
    solver: Box<dyn CaptchaSolver>,
    extractor: Box<dyn ViolationExtractor>,
}

impl Lookup {
    pub fn new(
        config: Config,
        sessions: Box<dyn SessionProvider>,
        solver: Box<dyn CaptchaSolver>,
        extractor: Box<dyn ViolationExtractor>,
    ) -> Self {
        Lookup {
            config,
            sessions,
            solver,
            extractor,
        }
    }

    /// Runs the full pipeline for one plate. Each attempt gets a fresh
    /// session and a fresh captcha; a rejected captcha or an exhausted
    /// sub-stage budget restarts the whole attempt until the top-level
    /// budget runs out. Never returns an error: every terminal failure is
    /// folded into the outcome.
    pub async fn lookup(&self, plate: &str, vehicle: VehicleType) -> Outcome {
        info!(
            "Fetching traffic violations for {} plate {}",
            vehicle.as_str(),
            plate
        );
        let mut retries_left = self.config.max_retries;
        loop {
            let reason = match self.attempt(plate, vehicle).await {
                Ok(violations) => {
                    return if violations.is_empty() {
                        Outcome::NoViolations
                    } else {
                        Outcome::Violations(violations)
                    }
                }
                Err(AttemptError::Fatal(e)) => {
                    error!("Lookup for plate {} failed: {}", plate, e);
                    return Outcome::Failed(LookupError::Other(e));
                }
                Err(AttemptError::Rejected) => "captcha verification failed".to_string(),
                Err(AttemptError::Transient(e)) => format!("network error ({})", e),
            };
            if retries_left == 0 {
                error!("Giving up on plate {}: {}", plate, reason);
                return Outcome::Failed(LookupError::MaxRetriesExceeded);
            }
            warn!(
                "{} for plate {}, restarting... ({} attempts left)",
                reason, plate, retries_left
            );
            retries_left -= 1;
            delay_for(self.config.retry_delay).await;
        }
    }

    async fn attempt(&self, plate: &str, vehicle: VehicleType) -> Result<Vec<Violation>, AttemptError> {
        let session = self.sessions.new_session();
        let captcha = fetch_captcha(&*session, &*self.solver, &self.config).await?;
        let response = submit_form(&*session, plate, &captcha, vehicle, &self.config).await?;
        if is_rejection(&response) {
            return Err(AttemptError::Rejected);
        }
        let page = fetch_results(&*session, plate, vehicle, &self.config).await?;
        self.extractor
            .extract(&page)
            .map_err(|e| AttemptError::Fatal(format!("failed to extract violations: {}", e)))
    }
}

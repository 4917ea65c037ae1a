use crate::config::Config;
use crate::session::{with_retry, FetchError, Session};
use async_trait::async_trait;
use failure::Error;
use std::env;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Black-box recognition engine: image bytes in, best-guess text out. The
/// text may be empty or wrong; only the upstream site judges correctness.
#[async_trait]
pub trait CaptchaSolver: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String, Error>;
}

/// Fetches the CAPTCHA image over `session` and runs it through the solver.
/// Transient network failures are retried locally on the same session; a
/// solver failure is not retried at all.
pub async fn fetch_captcha(
    session: &dyn Session,
    solver: &dyn CaptchaSolver,
    config: &Config,
) -> Result<String, FetchError> {
    let url = format!("{}{}", config.base_url, config.captcha_path);
    let image = with_retry(
        "captcha request",
        config.stage_retries,
        config.retry_delay,
        || session.get_bytes(&url),
    )
    .await?;
    let text = solver
        .recognize(&image)
        .await
        .map_err(|e| FetchError::Other(format!("failed to process captcha: {}", e)))?;
    Ok(text.trim().to_string())
}

/// Runs the `tesseract` command line tool over stdin/stdout. The binary to
/// invoke can be overridden with the TESSERACT_CMD environment variable.
pub struct TesseractCli {
    command: String,
}

impl TesseractCli {
    pub fn new() -> Self {
        TesseractCli {
            command: env::var("TESSERACT_CMD").unwrap_or_else(|_| "tesseract".to_string()),
        }
    }
}

#[async_trait]
impl CaptchaSolver for TesseractCli {
    async fn recognize(&self, image: &[u8]) -> Result<String, Error> {
        let mut child = Command::new(&self.command)
            .arg("stdin")
            .arg("stdout")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| format_err!("unable to open tesseract stdin"))?;
        stdin.write_all(image).await?;
        drop(stdin);
        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(format_err!("tesseract exited with {}", output.status));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

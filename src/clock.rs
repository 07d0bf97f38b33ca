use crate::Error;
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use std::sync::Arc;

pub(crate) static WORLD_TIME_API_BASE_URL: &str = "http://worldtimeapi.org/api/timezone";

/// Time source used to timestamp when an access token was obtained.
///
/// The timestamp is informational only; no refresh decision depends on it.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn now(&self) -> Result<DateTime<Utc>, Error>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    async fn now(&self) -> Result<DateTime<Utc>, Error> {
        Ok(Utc::now())
    }
}

/// Clock that asks worldtimeapi.org for the current time.
///
/// Meant for boards without a battery-backed real-time clock.
///
/// ```no_run
/// use spotrs::{Clock, WorldTimeClock};
///
/// # async fn example() -> Result<(), spotrs::Error> {
/// let clock = WorldTimeClock::new("Europe/London");
/// println!("{}", clock.now().await?);
/// # Ok(())
/// # }
/// ```
pub struct WorldTimeClock {
    timezone: String,
    transport: Arc<dyn HttpTransport>,
}

#[derive(Deserialize)]
struct WorldTimeResponse {
    datetime: String,
}

impl WorldTimeClock {
    /// * `timezone` - IANA timezone name, e.g. `Europe/London`
    pub fn new(timezone: impl Into<String>) -> Self {
        Self {
            timezone: timezone.into(),
            transport: Arc::new(ReqwestTransport::new()),
        }
    }

    pub fn with_transport<T: HttpTransport + 'static>(mut self, transport: T) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }
}

#[async_trait]
impl Clock for WorldTimeClock {
    async fn now(&self) -> Result<DateTime<Utc>, Error> {
        let url = format!("{WORLD_TIME_API_BASE_URL}/{}", self.timezone);
        let resp = self.transport.send(HttpRequest::new(Method::GET, url)).await?;

        if resp.status != 200 {
            return Err(Error::Clock(format!(
                "time lookup for {} returned status {}",
                self.timezone, resp.status
            )));
        }

        let body: WorldTimeResponse = serde_json::from_slice(&resp.body)?;
        DateTime::parse_from_rfc3339(&body.datetime)
            .map(|datetime| datetime.with_timezone(&Utc))
            .map_err(|e| Error::Clock(format!("invalid datetime {:?}: {e}", body.datetime)))
    }
}

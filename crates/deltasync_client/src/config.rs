//! Configuration for the polling client.

use deltasync_protocol::ProtocolFlavor;
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How a modified-since client expresses its baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SinceStyle {
    /// Quoted Version Tag, as received in `ETag`.
    #[default]
    Tag,
    /// HTTP-date of the last update.
    Date,
}

impl SinceStyle {
    /// Returns the short name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            SinceStyle::Tag => "tag",
            SinceStyle::Date => "date",
        }
    }
}

impl fmt::Display for SinceStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinceStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tag" | "etag" => Ok(SinceStyle::Tag),
            "date" | "http-date" => Ok(SinceStyle::Date),
            other => Err(format!("unknown since style '{}'", other)),
        }
    }
}

/// Configuration for polling a delta server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server URL, including the scheme.
    pub server_url: String,
    /// Negotiation flavor spoken.
    pub flavor: ProtocolFlavor,
    /// Baseline style for the modified-since flavor.
    pub since_style: SinceStyle,
    /// Interval between polls.
    pub poll_interval: Duration,
    /// Request timeout.
    pub timeout: Duration,
    /// Retry configuration for a single poll.
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Creates a new client configuration.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            flavor: ProtocolFlavor::Delta,
            since_style: SinceStyle::Tag,
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }

    /// Sets the negotiation flavor.
    pub fn with_flavor(mut self, flavor: ProtocolFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Sets the baseline style for the modified-since flavor.
    pub fn with_since_style(mut self, style: SinceStyle) -> Self {
        self.since_style = style;
        self
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts per poll.
    pub max_attempts: u32,
    /// Initial delay between retries.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub add_jitter: bool,
}

impl RetryConfig {
    /// Creates a new retry configuration.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }

    /// Creates a configuration with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            add_jitter: false,
        }
    }

    /// Sets the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enables or disables jitter.
    pub fn with_jitter(mut self, enabled: bool) -> Self {
        self.add_jitter = enabled;
        self
    }

    /// Calculates the delay before a given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        // `min` drops a NaN base in favour of the cap.
        let delay = base.min(self.max_delay.as_secs_f64()).max(0.0);

        if self.add_jitter && delay > 0.0 {
            // Up to 25% extra.
            let jitter = delay * 0.25 * rand::thread_rng().gen::<f64>();
            Duration::from_secs_f64(delay + jitter)
        } else {
            Duration::from_secs_f64(delay)
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3)
    }
}

//! Credentials, remote endpoints and timing

use rand::Rng;
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.iliad.it";
const LOGIN_PATH: &str = "/account/login";
const ACCOUNT_PATH: &str = "/account/consumi-e-credito";

/// Base refresh period; the remote site is hit a handful of times a day at most
const BASE_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);
const MAX_JITTER_MINUTES: u64 = 15;

/// Account login, fixed for the lifetime of a fetcher
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Login and account summary URLs
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub login: Url,
    pub account: Url,
}

impl Endpoints {
    /// Derive both endpoints from a site root such as `https://www.iliad.it`
    pub fn from_base(base: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse(base)?;
        Ok(Self {
            login: base.join(LOGIN_PATH)?,
            account: base.join(ACCOUNT_PATH)?,
        })
    }
}

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

/// Period between scheduled refreshes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollInterval(Duration);

impl PollInterval {
    pub fn fixed(period: Duration) -> Self {
        Self(period)
    }

    /// Six hours plus 0..=15 minutes, so several instances don't hit the site in lockstep
    pub fn randomized<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let jitter = rng.gen_range(0..=MAX_JITTER_MINUTES);
        Self(BASE_INTERVAL + Duration::from_secs(jitter * 60))
    }

    pub fn period(&self) -> Duration {
        self.0
    }
}

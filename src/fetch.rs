//! Authenticated account page retrieval
//!
//! Logs in with a form POST, then fetches the account summary page on the
//! same cookie-carrying client. The client is built lazily and kept across
//! cycles; any failure drops it so the next cycle starts a fresh session.

use crate::config::{Credentials, Endpoints, FetchConfig};
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info};

const LOGIN_IDENT_FIELD: &str = "login-ident";
const LOGIN_PASSWORD_FIELD: &str = "login-pwd";

/// Something that can produce the raw account page
#[async_trait]
pub trait PageSource: Send {
    async fn fetch(&mut self) -> Result<String, FetchError>;
}

/// Fetches the account page over a persistent HTTP session
pub struct SessionFetcher {
    credentials: Credentials,
    endpoints: Endpoints,
    config: FetchConfig,
    session: Option<Client>,
}

impl SessionFetcher {
    pub fn new(credentials: Credentials, endpoints: Endpoints, config: FetchConfig) -> Self {
        Self {
            credentials,
            endpoints,
            config,
            session: None,
        }
    }

    fn session(&mut self) -> Result<Client, FetchError> {
        if let Some(client) = &self.session {
            return Ok(client.clone());
        }

        debug!("opening new HTTP session");
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(&self.config.user_agent)
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .build()
            .map_err(|e| {
                error!(error = %e, "failed to build HTTP client");
                FetchError::from(e)
            })?;
        self.session = Some(client.clone());
        Ok(client)
    }

    async fn login_and_get(&mut self) -> Result<String, FetchError> {
        let client = self.session()?;

        let form = [
            (LOGIN_IDENT_FIELD, self.credentials.username.as_str()),
            (LOGIN_PASSWORD_FIELD, self.credentials.password.as_str()),
        ];
        let response = client
            .post(self.endpoints.login.clone())
            .form(&form)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Auth(response.status()));
        }

        let response = client.get(self.endpoints.account.clone()).send().await?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Retrieval(response.status()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageSource for SessionFetcher {
    async fn fetch(&mut self) -> Result<String, FetchError> {
        match self.login_and_get().await {
            Ok(html) => {
                info!("fetched most recent account data");
                Ok(html)
            }
            Err(e) => {
                match &e {
                    FetchError::Auth(status) => {
                        error!(status = status.as_u16(), "failed to log in to Iliad account")
                    }
                    FetchError::Retrieval(status) => {
                        error!(status = status.as_u16(), "failed to retrieve Iliad account page")
                    }
                    FetchError::Transport(err) => error!(error = %err, "error fetching Iliad data"),
                }
                self.session = None;
                Err(e)
            }
        }
    }
}

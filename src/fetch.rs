use crate::users::User;
use thiserror::Error;

/// Default users endpoint
pub const DEFAULT_ENDPOINT: &str = "https://66f44b0177b5e88970990f5f.mockapi.io/users";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} returned HTTP {code}")]
    Status { url: String, code: u16 },
    #[error("malformed response body: {0}")]
    Decode(String),
}

/// Source of user records, so the view can be driven without a network
pub trait UserSource: Send + Sync {
    fn fetch_users(&self) -> Result<Vec<User>, FetchError>;
}

pub struct HttpSource {
    url: String,
    agent: ureq::Agent,
}

impl HttpSource {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            agent: ureq::Agent::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl UserSource for HttpSource {
    fn fetch_users(&self) -> Result<Vec<User>, FetchError> {
        tracing::debug!(url = %self.url, "GET users");

        let resp = match self.agent.get(&self.url).call() {
            Ok(r) => r,
            Err(ureq::Error::Status(code, _)) => {
                return Err(FetchError::Status {
                    url: self.url.clone(),
                    code,
                })
            }
            Err(e) => {
                return Err(FetchError::Transport {
                    url: self.url.clone(),
                    message: e.to_string(),
                })
            }
        };

        let body = resp.into_string().map_err(|e| FetchError::Transport {
            url: self.url.clone(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

use crate::domain::Identity;
use crate::interface_adapters::protocol::{
    ErrorResponse, SessionResponse, SignInRequest, SignUpData, SignUpRequest, SignUpResponse,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum AuthError {
    // Wrong email or password.
    InvalidCredentials,
    Transport(reqwest::Error),
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },
    Decode(reqwest::Error),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "invalid email or password"),
            AuthError::Transport(err) => write!(f, "auth transport error: {err}"),
            AuthError::Rejected { status, message } => {
                if let Some(message) = message {
                    write!(f, "auth rejected {status}: {message}")
                } else {
                    write!(f, "auth rejected {status}")
                }
            }
            AuthError::Decode(err) => write!(f, "auth response decode error: {err}"),
        }
    }
}

impl std::error::Error for AuthError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    // Account is usable right away.
    SignedIn(Identity),
    // Account exists but the email address must be confirmed before sign-in.
    ConfirmationPending { user_id: String },
}

impl From<SignUpResponse> for SignUpOutcome {
    fn from(response: SignUpResponse) -> Self {
        match response {
            SignUpResponse::Session(session) => SignUpOutcome::SignedIn(session.into()),
            SignUpResponse::Pending(user) => SignUpOutcome::ConfirmationPending { user_id: user.id },
        }
    }
}

// Thin reqwest client for password sign-in against the hosted auth API.
#[derive(Clone)]
pub struct AuthClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, AuthError> {
        let response = request
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(AuthError::Transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|payload| payload.message);
        Err(AuthError::Rejected { status, message })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let request = self.http.post(url).json(&SignInRequest { email, password });

        let response = match self.send(request).await {
            Err(AuthError::Rejected { status, .. }) if status == StatusCode::BAD_REQUEST => {
                return Err(AuthError::InvalidCredentials);
            }
            other => other?,
        };
        response
            .json::<SessionResponse>()
            .await
            .map(Identity::from)
            .map_err(AuthError::Decode)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let request = self.http.post(url).json(&SignUpRequest {
            email,
            password,
            data: SignUpData { username },
        });

        let response = self.send(request).await?;
        response
            .json::<SignUpResponse>()
            .await
            .map(SignUpOutcome::from)
            .map_err(AuthError::Decode)
    }

    pub async fn sign_out(&self, identity: &Identity) -> Result<(), AuthError> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let request = self.http.post(url).bearer_auth(&identity.access_token);
        self.send(request).await?;
        Ok(())
    }
}

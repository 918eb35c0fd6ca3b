//! services/api/src/adapters/google.rs
//!
//! Google authorization-code flow with PKCE. The adapter builds the
//! authorization URL, persists the CSRF state + PKCE verifier through the
//! `DatabaseService` port, and on callback exchanges the code, fetches the
//! Google userinfo profile, and reconciles it into a local user record.

use std::sync::Arc;

use chrono::{Duration, Utc};
use leximate_core::domain::User;
use leximate_core::ports::{DatabaseService, PortError, PortResult};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;

use crate::config::GoogleOAuthConfig;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Google user info from the userinfo API.
#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: String,
    name: Option<String>,
    given_name: Option<String>,
}

/// OAuth client type with auth URL and token URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Google OAuth handler.
pub struct GoogleOAuth {
    config: GoogleOAuthConfig,
    db: Arc<dyn DatabaseService>,
}

impl GoogleOAuth {
    pub fn new(config: GoogleOAuthConfig, db: Arc<dyn DatabaseService>) -> PortResult<Self> {
        // Validate the redirect URL once at construction.
        RedirectUrl::new(config.redirect_url.clone())
            .map_err(|e| PortError::Unexpected(format!("Invalid GOOGLE_REDIRECT_URL: {}", e)))?;
        Ok(Self { config, db })
    }

    fn create_client(&self) -> ConfiguredClient {
        BasicClient::new(ClientId::new(self.config.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.config.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.to_string()).expect("static auth url"))
            .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URL.to_string()).expect("static token url"))
            .set_redirect_uri(
                RedirectUrl::new(self.config.redirect_url.clone())
                    .expect("redirect url validated at construction"),
            )
    }

    /// Generates the authorization URL with PKCE, persisting the CSRF state
    /// and verifier with a 10-minute expiry.
    pub async fn generate_auth_url(&self) -> PortResult<String> {
        let client = self.create_client();
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        self.db
            .store_oauth_state(
                csrf_state.secret(),
                pkce_verifier.secret(),
                Utc::now() + Duration::minutes(10),
            )
            .await?;

        Ok(auth_url.to_string())
    }

    /// Exchanges the authorization code for a token, fetches the userinfo
    /// profile, and reconciles it into a local account: match on google_id
    /// first, then on email (backfilling google_id), else create a new user.
    pub async fn exchange_code(&self, code: &str, state: &str) -> PortResult<User> {
        let pkce_verifier = self
            .db
            .take_oauth_state(state)
            .await?
            .ok_or_else(|| PortError::Invalid("Invalid or expired OAuth state".to_string()))?;

        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let client = self.create_client();
        let token_result = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&http_client)
            .await
            .map_err(|e| PortError::Upstream(format!("Token exchange failed: {}", e)))?;

        let access_token = token_result.access_token().secret();

        let google_user: GoogleUser = reqwest::Client::new()
            .get(GOOGLE_USERINFO_URL)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?
            .json()
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let email = google_user.email.to_lowercase();

        if let Some(user) = self.db.get_user_by_google_id(&google_user.id).await? {
            return Ok(user);
        }

        if let Some(user) = self.db.find_user_by_email(&email).await? {
            if user.google_id.is_none() {
                self.db.link_google_id(user.id, &google_user.id).await?;
            }
            return Ok(user);
        }

        let username = google_user
            .name
            .or(google_user.given_name)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());

        self.db
            .create_google_user(&username, &email, &google_user.id)
            .await
    }
}

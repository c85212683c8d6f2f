//! OAuth2 for an installed app: consent URL, code exchange, refresh, and
//! the token file that carries the refresh token between runs.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::GoogleClient;
use crate::core::AppConfig;

pub const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/drive",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// The `installed` (or `web`) section of a client secrets file downloaded
/// from the Google Cloud console.
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

#[derive(Debug, Deserialize)]
struct ClientSecrets {
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    /// Credentials from the environment, falling back to the client
    /// secrets file.
    pub fn load(config: &AppConfig) -> Result<Self> {
        if let (Some(client_id), Some(client_secret)) =
            (&config.google_client_id, &config.google_client_secret)
        {
            return Ok(Self {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            });
        }
        Self::from_secrets_file(&config.credentials_path)
    }

    pub fn from_secrets_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| {
            format!(
                "Missing client credentials: set MAILFILER_GOOGLE_CLIENT_ID and MAILFILER_GOOGLE_CLIENT_SECRET or provide {}",
                path.display()
            )
        })?;
        let file: ClientSecretsFile = serde_json::from_str(&text)
            .with_context(|| format!("Invalid client secrets file {}", path.display()))?;
        let secrets = file
            .installed
            .or(file.web)
            .ok_or(anyhow!("No installed or web client in {}", path.display()))?;
        Ok(Self {
            client_id: secrets.client_id,
            client_secret: secrets.client_secret,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Token persisted to disk between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
}

impl StoredToken {
    /// Build from a token response, keeping the previous refresh token
    /// when the response doesn't include a new one.
    pub fn from_response(response: TokenResponse, previous: Option<&StoredToken>) -> Self {
        let refresh_token = response
            .refresh_token
            .or_else(|| previous.and_then(|t| t.refresh_token.clone()));
        Self {
            access_token: response.access_token,
            refresh_token,
            expires_at: response
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
            scope: response.scope,
        }
    }
}

pub fn load_token(path: impl AsRef<Path>) -> Result<Option<StoredToken>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    let token = serde_json::from_str(&text)
        .with_context(|| format!("Invalid token file {}", path.display()))?;
    Ok(Some(token))
}

pub fn save_token(path: impl AsRef<Path>, token: &StoredToken) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(token)?)
        .with_context(|| format!("Failed to write token file {}", path.display()))
}

/// URL the user opens to grant offline access to all four APIs.
pub fn authorization_url(auth_endpoint: &str, client_id: &str, redirect_uri: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        auth_endpoint,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&SCOPES.join(" "))
    )
}

async fn token_request(token_url: &str, params: &HashMap<&str, &str>) -> Result<TokenResponse> {
    let res = Client::new().post(token_url).form(params).send().await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&text) {
            anyhow::bail!(
                "Token request failed: {} - {}",
                err.error,
                err.error_description
            );
        }
        anyhow::bail!("Token request failed: {} ({})", status, text);
    }
    Ok(serde_json::from_str(&text)?)
}

pub async fn exchange_code_for_token(
    token_url: &str,
    credentials: &ClientCredentials,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    let params = HashMap::from([
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("redirect_uri", redirect_uri),
    ]);
    token_request(token_url, &params).await
}

pub async fn refresh_access_token(
    token_url: &str,
    credentials: &ClientCredentials,
    refresh_token: &str,
) -> Result<TokenResponse> {
    let params = HashMap::from([
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
    ]);
    token_request(token_url, &params).await
}

/// Load the stored token, refresh it, write it back and return a client
/// using the fresh access token.
pub async fn authenticated_client(config: &AppConfig) -> Result<GoogleClient> {
    let stored = load_token(&config.token_path)?.ok_or(anyhow!(
        "No token at {}, run `mailfiler auth` first",
        config.token_path
    ))?;
    let refresh_token = stored
        .refresh_token
        .clone()
        .ok_or(anyhow!("No refresh token in {}", config.token_path))?;
    let credentials = ClientCredentials::load(config)?;

    let response =
        refresh_access_token(&config.endpoints.oauth_token, &credentials, &refresh_token).await?;
    let token = StoredToken::from_response(response, Some(&stored));
    save_token(&config.token_path, &token)?;
    tracing::info!("OAuth successful");

    Ok(GoogleClient::new(
        &token.access_token,
        config.endpoints.clone(),
    ))
}

use std::env;

use crate::google::ApiEndpoints;
use crate::sync::DEFAULT_ROOT_FOLDER;
use crate::sync::folders::DuplicatePolicy;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub token_path: String,
    pub credentials_path: String,
    pub checkpoint_path: String,
    pub root_folder: String,
    pub duplicate_policy: DuplicatePolicy,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_uri: String,
    pub endpoints: ApiEndpoints,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("MAILFILER_STORAGE_PATH").unwrap_or("./".to_string());
        let storage_path = storage_path.trim_end_matches('/').to_string();
        let token_path = env::var("MAILFILER_TOKEN_PATH")
            .unwrap_or_else(|_| format!("{}/token.json", storage_path));
        let credentials_path = env::var("MAILFILER_CREDENTIALS_PATH")
            .unwrap_or_else(|_| format!("{}/cred.json", storage_path));
        let checkpoint_path = env::var("MAILFILER_CHECKPOINT_PATH")
            .unwrap_or_else(|_| format!("{}/last_created_data.json", storage_path));
        let root_folder =
            env::var("MAILFILER_ROOT_FOLDER").unwrap_or_else(|_| DEFAULT_ROOT_FOLDER.to_string());
        let duplicate_policy = match env::var("MAILFILER_DUPLICATE_POLICY") {
            Ok(value) => value.parse().unwrap_or_else(|err| {
                tracing::warn!("Ignoring MAILFILER_DUPLICATE_POLICY: {}", err);
                DuplicatePolicy::default()
            }),
            Err(_) => DuplicatePolicy::default(),
        };
        let google_client_id = env::var("MAILFILER_GOOGLE_CLIENT_ID").ok();
        let google_client_secret = env::var("MAILFILER_GOOGLE_CLIENT_SECRET").ok();
        let google_redirect_uri = env::var("MAILFILER_GOOGLE_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost".to_string());

        let defaults = ApiEndpoints::default();
        let endpoints = ApiEndpoints {
            gmail: env::var("MAILFILER_GMAIL_API_URL").unwrap_or(defaults.gmail),
            drive: env::var("MAILFILER_DRIVE_API_URL").unwrap_or(defaults.drive),
            sheets: env::var("MAILFILER_SHEETS_API_URL").unwrap_or(defaults.sheets),
            docs: env::var("MAILFILER_DOCS_API_URL").unwrap_or(defaults.docs),
            oauth_token: env::var("MAILFILER_OAUTH_TOKEN_URL").unwrap_or(defaults.oauth_token),
            oauth_auth: defaults.oauth_auth,
        };

        Self {
            storage_path,
            token_path,
            credentials_path,
            checkpoint_path,
            root_folder,
            duplicate_policy,
            google_client_id,
            google_client_secret,
            google_redirect_uri,
            endpoints,
        }
    }
}

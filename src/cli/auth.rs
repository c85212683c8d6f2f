use anyhow::{Result, anyhow};
use std::io::{self, Write};

use crate::core::AppConfig;
use crate::google::oauth::{
    ClientCredentials, StoredToken, authorization_url, exchange_code_for_token, save_token,
};

/// Accept either the bare code or the whole redirect URL it came back on.
fn parse_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match reqwest::Url::parse(input) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned()),
        Err(_) => Some(input.to_string()),
    }
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let credentials = ClientCredentials::load(config)?;
    let redirect_uri = &config.google_redirect_uri;
    let auth_url = authorization_url(
        &config.endpoints.oauth_auth,
        &credentials.client_id,
        redirect_uri,
    );
    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        auth_url
    );
    print!("Paste the authorization code (or the URL you were redirected to) here: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let code = parse_code(&input).ok_or(anyhow!("No authorization code given"))?;

    let response = exchange_code_for_token(
        &config.endpoints.oauth_token,
        &credentials,
        &code,
        redirect_uri,
    )
    .await?;
    if response.refresh_token.is_none() {
        return Err(anyhow!("No refresh token in response"));
    }

    let token = StoredToken::from_response(response, None);
    save_token(&config.token_path, &token)?;
    println!("Token saved to {}.", config.token_path);

    Ok(())
}

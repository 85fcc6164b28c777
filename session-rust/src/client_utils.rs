use crate::{SessionError, SessionResult};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};

/// Issue a GET request, optionally with a bearer token, and parse the JSON
/// response. Throws error on non OK status code.
pub async fn get_json<R: DeserializeOwned>(
    client: &Client,
    url: &str,
    bearer_token: Option<&str>,
) -> SessionResult<R> {
    let mut request = client.get(url);
    if let Some(token) = bearer_token {
        request = request.bearer_auth(token);
    }
    let response = ensure_success(request.send().await?).await?;
    Ok(response.json::<R>().await?)
}

/// Create a JSON request, parse the response.
/// Throws error on non OK status code.
pub async fn send_json<T: Serialize, R: DeserializeOwned>(
    client: &Client,
    url: &str,
    data: &T,
) -> SessionResult<R> {
    let response = client.post(url).json(data).send().await?;
    let response = ensure_success(response).await?;
    Ok(response.json::<R>().await?)
}

/// Create a JSON request whose response body is irrelevant and return the
/// raw status code. Transport failures are still errors.
pub async fn send_for_status<T: Serialize>(
    client: &Client,
    url: &str,
    data: &T,
) -> SessionResult<reqwest::StatusCode> {
    let response = client.post(url).json(data).send().await?;
    Ok(response.status())
}

async fn ensure_success(response: Response) -> SessionResult<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(SessionError::StatusCode(
            response.status(),
            response.text().await.unwrap_or_default(),
        ))
    }
}

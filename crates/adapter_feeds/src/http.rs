//! Shared blocking HTTP client construction.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::FeedError;

const USER_AGENT: &str = concat!("petrocost/", env!("CARGO_PKG_VERSION"));

/// Blocking client with connect and overall timeouts.
pub(crate) fn client(timeout: Duration) -> Result<Client, FeedError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()?)
}

/// GET `url` and return the body, failing on non-success status.
pub(crate) fn get_text(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<String, FeedError> {
    let response = client.get(url).query(query).send()?.error_for_status()?;
    Ok(response.text()?)
}

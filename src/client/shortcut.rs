//! One-shot helpers that start a framework app in a throwaway session.
//!
//! The session is closed before the helper returns, so the returned
//! [`App`] holds a closed connection. Call [`App::rebind`] with a fresh
//! connection before stopping or querying it.

use tracing::info;

use crate::error::Result;
use crate::mock::{App, AppKind};

use super::core::Client;
use super::options::AppOptions;

/// Starts an app of `kind` on `port` through the default client.
///
/// The app is named after the framework (`"flask"`, ...).
///
/// # Errors
///
/// Connection errors, or [`Error::App`](crate::Error::App) if the start is
/// rejected.
pub async fn mock_via(kind: AppKind, port: u16, options: AppOptions) -> Result<App> {
    mock_via_with(&mut Client::default(), kind, port, options).await
}

/// Like [`mock_via`], through an explicit client.
///
/// # Errors
///
/// Same as [`mock_via`].
pub async fn mock_via_with(
    client: &mut Client,
    kind: AppKind,
    port: u16,
    options: AppOptions,
) -> Result<App> {
    let app = client
        .session(async move |client: &Client| -> Result<App> {
            let mut app = client.app(kind.as_str(), port, options)?;
            app.start().await?;
            Ok(app)
        })
        .await?;

    info!(kind = %kind, port, "Mock app started");
    Ok(app)
}

/// Starts a Sanic app on `port`.
///
/// # Errors
///
/// Same as [`mock_via`].
pub async fn mock_via_sanic(port: u16, options: AppOptions) -> Result<App> {
    mock_via(AppKind::Sanic, port, options).await
}

/// Starts a Django app on `port`.
///
/// # Errors
///
/// Same as [`mock_via`].
pub async fn mock_via_django(port: u16, options: AppOptions) -> Result<App> {
    mock_via(AppKind::Django, port, options).await
}

/// Starts a Flask app on `port`.
///
/// # Errors
///
/// Same as [`mock_via`].
pub async fn mock_via_flask(port: u16, options: AppOptions) -> Result<App> {
    mock_via(AppKind::Flask, port, options).await
}

use crate::config::Settings;
use crate::error::{MirrorError, Result};
use crate::html;
use log::{debug, info};
use reqwest::cookie::Jar;
use reqwest::header::REFERER;
use reqwest::redirect::Policy;
use std::sync::Arc;

/// Authenticated connection to the PhenoCam web service.
///
/// Two clients share one cookie jar: `client` follows redirects for the form
/// pages, `raw_client` never does and is used for the single-use archive links.
/// `public_client` carries no cookies and serves the site metadata.
pub struct PhenocamClient {
    pub(crate) settings: Settings,
    pub(crate) client: reqwest::Client,
    pub(crate) raw_client: reqwest::Client,
    pub(crate) public_client: reqwest::Client,
}

impl PhenocamClient {
    pub fn new(settings: Settings) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .connection_verbose(settings.debug)
            .build()?;
        let raw_client = reqwest::Client::builder()
            .cookie_provider(jar)
            .redirect(Policy::none())
            .connection_verbose(settings.debug)
            .build()?;
        let public_client = reqwest::Client::builder()
            .connection_verbose(settings.debug)
            .build()?;

        Ok(Self {
            settings,
            client,
            raw_client,
            public_client,
        })
    }

    /// Fetches the form at `url`, echoes its hidden fields back with `overlay`
    /// applied on top, and returns the body of the POST response.
    pub(crate) async fn submit_form(&self, url: &str, overlay: &[(&str, &str)]) -> Result<String> {
        info!("GET request to {}", url);
        let response = self.client.get(url).send().await?;
        debug!("status: {}", response.status());
        if !response.status().is_success() {
            return Err(MirrorError::status(url, response.status()));
        }

        let mut form_data = html::hidden_fields(&response.text().await?);
        debug!("hidden form fields: {:?}", form_data.keys().collect::<Vec<_>>());
        for (name, value) in overlay {
            form_data.insert(name.to_string(), value.to_string());
        }

        info!("POST request to {}", url);
        let response = self
            .client
            .post(url)
            .header(REFERER, url)
            .form(&form_data)
            .send()
            .await?;
        debug!("status: {}", response.status());
        if !response.status().is_success() {
            return Err(MirrorError::status(url, response.status()));
        }

        Ok(response.text().await?)
    }

    /// Logs in; the session cookies land in the shared jar.
    ///
    /// Bad credentials and service failures are not told apart here: both
    /// surface as a non-success status.
    pub async fn login(&self) -> Result<()> {
        let login_url = self.settings.login_url();
        let next = self.settings.request_url();
        self.submit_form(
            &login_url,
            &[
                ("username", self.settings.username.as_str()),
                ("password", self.settings.password.as_str()),
                ("submit", ""),
                ("next", next.as_str()),
            ],
        )
        .await?;
        info!("Logged in as {}", self.settings.username);
        Ok(())
    }
}

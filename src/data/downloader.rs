//! Downloader module for Horizons vector tables
//!
//! Requests are plain `key=value` documents posted to the Horizons file API.
//! Every request asks for one-minute vectors of position and velocity in
//! km and km/s, ICRF ecliptic, centered on the solar system barycenter.

use std::time::Duration;

use crate::constants::HORIZONS_FILE_API;
use crate::time::{MonthKey, QueryWindow};
use crate::Result;
use crate::UnisimError;
use log::info;

/// One vector table request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HorizonsRequest {
    /// Horizons command string identifying the target, e.g. `399`
    pub command: String,
    pub window: QueryWindow,
}

impl HorizonsRequest {
    /// Create a request for `command` over `window`
    pub fn new(command: &str, window: QueryWindow) -> Self {
        Self {
            command: command.to_string(),
            window,
        }
    }

    /// Create a request covering one cache month
    pub fn for_month(command: &str, month: MonthKey) -> Self {
        Self::new(command, month.query_window())
    }

    /// The input document submitted to the file API
    pub fn input_document(&self) -> String {
        format!(
            "!$$SOF\n\
             MAKE_EPHEM=YES\n\
             COMMAND='{}'\n\
             EPHEM_TYPE=VECTORS\n\
             CENTER='500@0'\n\
             START_TIME='{}'\n\
             STOP_TIME='{}'\n\
             STEP_SIZE='1 MINUTES'\n\
             VEC_TABLE='2'\n\
             REF_SYSTEM='ICRF'\n\
             REF_PLANE='ECLIPTIC'\n\
             VEC_CORR='NONE'\n\
             CAL_TYPE='G'\n\
             OUT_UNITS='KM-S'\n\
             VEC_LABELS='YES'\n\
             VEC_DELTA_T='NO'\n\
             CSV_FORMAT='YES'\n\
             OBJ_DATA='YES'\n\
             !$$EOF",
            self.command,
            self.window.start_str(),
            self.window.stop_str()
        )
    }
}

/// Something able to submit a request and return the raw response text
pub trait Transport {
    fn submit(&self, request: &HorizonsRequest) -> Result<String>;
}

/// Transport posting to the Horizons file API over HTTPS
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpTransport {
    /// Create a transport for the public Horizons endpoint
    pub fn new() -> Result<Self> {
        Self::with_url(HORIZONS_FILE_API)
    }

    /// Create a transport for a custom endpoint
    pub fn with_url(url: &str) -> Result<Self> {
        // Create HTTP client with timeout
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                UnisimError::TransportError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn submit(&self, request: &HorizonsRequest) -> Result<String> {
        let input = request.input_document();
        let response = self
            .client
            .post(&self.url)
            .form(&[("format", "text"), ("input", input.as_str())])
            .send()
            .map_err(|e| {
                UnisimError::TransportError(format!(
                    "Failed to reach {} for {}: {}",
                    self.url, request.command, e
                ))
            })?;

        if !response.status().is_success() {
            return Err(UnisimError::TransportError(format!(
                "Request for {} failed, status: {}",
                request.command,
                response.status()
            )));
        }

        response.text().map_err(|e| {
            UnisimError::TransportError(format!("Failed to read response: {}", e))
        })
    }
}

/// Download the raw vector table of `command` for one month
pub fn download_month(transport: &dyn Transport, command: &str, month: MonthKey) -> Result<String> {
    let request = HorizonsRequest::for_month(command, month);
    info!(
        "Downloading {} from {} to {}",
        command,
        request.window.start_str(),
        request.window.stop_str()
    );
    let text = transport.submit(&request)?;
    info!("Downloaded {} ({} bytes)", command, text.len());
    Ok(text)
}

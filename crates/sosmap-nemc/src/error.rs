use thiserror::Error;

/// Errors returned by the data.go.kr feed client.
#[derive(Debug, Error)]
pub enum NemcError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-`00` `resultCode` in the envelope.
    #[error("data.go.kr API error {code}: {message}")]
    Api { code: String, message: String },

    /// The response body could not be parsed as a feed envelope.
    #[error("XML parse error for {context}: {source}")]
    Xml {
        context: String,
        #[source]
        source: quick_xml::Error,
    },

    /// No service key configured; the portal rejects keyless requests.
    #[error("NEMC_SERVICE_KEY is not configured")]
    MissingServiceKey,
}

//! HTTP client for the data.go.kr feed services.
//!
//! Wraps `reqwest` with service-key management, envelope error checking,
//! and retry on transient transport failures. All endpoints live under
//! one host; the base URL is overridable so tests can point the client at
//! a wiremock server.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, Url};
use sosmap_core::{AppConfig, Region};

use crate::error::NemcError;
use crate::retry::retry_with_backoff;
use crate::types::{RawAedItem, RawAnimalItem, RawBedItem, RawDutyItem};
use crate::xml;

const DEFAULT_BASE_URL: &str = "http://apis.data.go.kr/";
const DEFAULT_USER_AGENT: &str = "sosmap/0.1 (emergency-services-lookup)";
const DEFAULT_PAGE_SIZE: u32 = 3000;
/// The MAFRA animal-hospital feed caps page size well below the NEMC ones.
const ANIMAL_PAGE_SIZE: u32 = 1000;

const HOSPITAL_LIST_PATH: &str = "B552657/ErmctInfoInqireService/getEgytListInfoInqire";
const REALTIME_BEDS_PATH: &str = "B552657/ErmctInfoInqireService/getEmrrmRltmUsefulSckbdInfoInqire";
const PHARMACY_LIST_PATH: &str = "B552657/ErmctInsttInfoInqireService/getParmacyListInfoInqire";
const AED_LIST_PATH: &str = "B552657/AEDInfoInqireService/getAedLcinfoInqire";
const ANIMAL_LIST_PATH: &str = "1543061/animalHosptlInfoService/animalHosptlInfo";

/// Client for the data.go.kr emergency-data feeds.
pub struct NemcClient {
    client: Client,
    service_key: String,
    base_url: Url,
    page_size: u32,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl NemcClient {
    /// Creates a client pointed at the production portal.
    ///
    /// # Errors
    ///
    /// Returns [`NemcError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(service_key: &str, timeout_secs: u64) -> Result<Self, NemcError> {
        Self::with_base_url(service_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NemcError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`NemcError::Api`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(
        service_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NemcError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        // Normalise: the endpoint paths are joined onto the base, so it
        // must end with exactly one slash.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| NemcError::Api {
            code: "client".to_owned(),
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            service_key: service_key.to_owned(),
            base_url,
            page_size: DEFAULT_PAGE_SIZE,
            max_retries: 3,
            retry_backoff_base_ms: 5_000,
        })
    }

    /// Creates a client from application config.
    ///
    /// # Errors
    ///
    /// Returns [`NemcError::MissingServiceKey`] when no service key is
    /// configured, or [`NemcError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NemcError> {
        let service_key = config
            .service_key
            .as_deref()
            .ok_or(NemcError::MissingServiceKey)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.feed_request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.feed_user_agent.clone())
            .build()?;

        let base_url = Url::parse(DEFAULT_BASE_URL).map_err(|e| NemcError::Api {
            code: "client".to_owned(),
            message: format!("invalid base URL '{DEFAULT_BASE_URL}': {e}"),
        })?;

        Ok(Self {
            client,
            service_key: service_key.to_owned(),
            base_url,
            page_size: config.feed_page_size,
            max_retries: config.feed_max_retries,
            retry_backoff_base_ms: config.feed_retry_backoff_base_secs.saturating_mul(1000),
        })
    }

    /// Fetches the emergency-room base list (names, addresses, coordinates,
    /// duty-time tokens) for a region, or nationwide when `region` is `None`.
    ///
    /// # Errors
    ///
    /// - [`NemcError::Api`] if the envelope carries a non-`00` result code.
    /// - [`NemcError::Http`] on transport failure after retries.
    /// - [`NemcError::Xml`] if the body is not a parseable envelope.
    pub async fn hospital_list(&self, region: Option<&Region>) -> Result<Vec<RawDutyItem>, NemcError> {
        let params = region_params("Q0", "Q1", region);
        let items = self
            .fetch_items(HOSPITAL_LIST_PATH, self.page_size, &params, "hospital_list")
            .await?;
        Ok(items.iter().map(RawDutyItem::from_fields).collect())
    }

    /// Fetches realtime emergency-bed availability for a region.
    ///
    /// # Errors
    ///
    /// Same as [`NemcClient::hospital_list`].
    pub async fn realtime_beds(&self, region: Option<&Region>) -> Result<Vec<RawBedItem>, NemcError> {
        let params = region_params("STAGE1", "STAGE2", region);
        let items = self
            .fetch_items(REALTIME_BEDS_PATH, self.page_size, &params, "realtime_beds")
            .await?;
        Ok(items.iter().map(RawBedItem::from_fields).collect())
    }

    /// Fetches the pharmacy list with `dutyTime{1..8}` schedule tokens.
    ///
    /// # Errors
    ///
    /// Same as [`NemcClient::hospital_list`].
    pub async fn pharmacy_list(&self, region: Option<&Region>) -> Result<Vec<RawDutyItem>, NemcError> {
        let params = region_params("Q0", "Q1", region);
        let items = self
            .fetch_items(PHARMACY_LIST_PATH, self.page_size, &params, "pharmacy_list")
            .await?;
        Ok(items.iter().map(RawDutyItem::from_fields).collect())
    }

    /// Fetches AED installation locations.
    ///
    /// # Errors
    ///
    /// Same as [`NemcClient::hospital_list`].
    pub async fn aed_list(&self, region: Option<&Region>) -> Result<Vec<RawAedItem>, NemcError> {
        let params = region_params("Q0", "Q1", region);
        let items = self
            .fetch_items(AED_LIST_PATH, self.page_size, &params, "aed_list")
            .await?;
        Ok(items.iter().map(RawAedItem::from_fields).collect())
    }

    /// Fetches the animal-hospital list. This feed takes no region filter.
    ///
    /// # Errors
    ///
    /// Same as [`NemcClient::hospital_list`].
    pub async fn animal_hospital_list(&self) -> Result<Vec<RawAnimalItem>, NemcError> {
        let items = self
            .fetch_items(ANIMAL_LIST_PATH, ANIMAL_PAGE_SIZE, &[], "animal_hospital_list")
            .await?;
        Ok(items.iter().map(RawAnimalItem::from_fields).collect())
    }

    async fn fetch_items(
        &self,
        path: &str,
        page_size: u32,
        params: &[(&str, String)],
        context: &str,
    ) -> Result<Vec<BTreeMap<String, String>>, NemcError> {
        let url = self.endpoint_url(path, page_size, params)?;

        let body = retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url).send().await?.error_for_status()?;
                Ok(response.text().await?)
            }
        })
        .await?;

        let envelope = xml::parse_envelope(&body).map_err(|source| NemcError::Xml {
            context: context.to_owned(),
            source,
        })?;

        if let Some(code) = &envelope.result_code {
            if code != "00" {
                return Err(NemcError::Api {
                    code: code.clone(),
                    message: envelope.result_msg.clone().unwrap_or_default(),
                });
            }
        }

        tracing::debug!(
            context,
            items = envelope.items.len(),
            total = envelope.total_count,
            "fetched feed page"
        );

        Ok(envelope.items)
    }

    fn endpoint_url(
        &self,
        path: &str,
        page_size: u32,
        params: &[(&str, String)],
    ) -> Result<Url, NemcError> {
        let mut url = self.base_url.join(path).map_err(|e| NemcError::Api {
            code: "client".to_owned(),
            message: format!("invalid endpoint path '{path}': {e}"),
        })?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("serviceKey", &self.service_key);
            pairs.append_pair("numOfRows", &page_size.to_string());
            pairs.append_pair("pageNo", "1");
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

fn region_params(
    city_key: &'static str,
    district_key: &'static str,
    region: Option<&Region>,
) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(region) = region {
        params.push((city_key, region.city.clone()));
        if let Some(district) = &region.district {
            params.push((district_key, district.clone()));
        }
    }
    params
}

// Module containing the AlAdhan response envelope
mod response;

use std::fmt;
use std::future::Future;

use chrono::{Local, NaiveDate};
use reqwest::Url;
use tracing::{debug, error, info};

use crate::error::AppError;

pub use response::{DateInfo, Meta, Timings, TimingsResponse};

// Base of the AlAdhan prayer timings API
pub const TIMINGS_ENDPOINT: &str = "https://api.aladhan.com/v1";

/// Where timings are fetched for. Coordinates win over a named city, so a
/// location is always exactly one of the two.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City { city: String, country: String },
    Coordinates { latitude: f64, longitude: f64 },
}

impl Location {
    pub fn city(city: impl Into<String>, country: impl Into<String>) -> Self {
        Location::City {
            city: city.into(),
            country: country.into(),
        }
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        Location::Coordinates {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::City { city, country } => write!(f, "{city}, {country}"),
            Location::Coordinates {
                latitude,
                longitude,
            } => write!(f, "{latitude:.4}, {longitude:.4}"),
        }
    }
}

/// One day's timings, as fetched. Only meaningful on `fetched_for`.
#[derive(Debug, Clone)]
pub struct TimingsSnapshot {
    pub timings: Timings,
    pub date: DateInfo,
    pub meta: Meta,
    pub fetched_for: NaiveDate,
}

impl TimingsSnapshot {
    pub fn from_response(response: TimingsResponse, fetched_for: NaiveDate) -> Self {
        TimingsSnapshot {
            timings: response.data.timings,
            date: response.data.date,
            meta: response.data.meta,
            fetched_for,
        }
    }

    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.fetched_for == date
    }
}

/// Anything that can produce today's timings for a location.
pub trait TimingsSource {
    fn fetch(
        &self,
        location: &Location,
    ) -> impl Future<Output = Result<TimingsSnapshot, AppError>> + Send;
}

/// HTTP client for the AlAdhan timings API.
#[derive(Debug, Clone)]
pub struct TimingsClient {
    http: reqwest::Client,
    base_url: String,
    method: u8,
    school: u8,
}

impl TimingsClient {
    pub fn new(base_url: impl Into<String>, method: u8, school: u8) -> Self {
        TimingsClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            method,
            school,
        }
    }

    /// Fetches today's timings for a named city.
    ///
    /// # Arguments
    /// * `city` - City name, e.g. "Bahawalpur"
    /// * `country` - Country name or code, e.g. "Pakistan"
    ///
    /// # Returns
    /// * `TimingsSnapshot` for the current local date
    /// * Error if the request fails or the API answers with a failure status
    pub async fn fetch_by_city(
        &self,
        city: &str,
        country: &str,
    ) -> Result<TimingsSnapshot, AppError> {
        info!("Fetching timings for city: {}, {}", city, country);
        let today = Local::now().date_naive();
        let url = self.timings_by_city_url(city, country, today)?;
        self.get(url, today).await
    }

    /// Fetches today's timings for a latitude/longitude pair.
    pub async fn fetch_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<TimingsSnapshot, AppError> {
        info!("Fetching timings for coordinates: {}, {}", latitude, longitude);
        let today = Local::now().date_naive();
        let url = self.timings_by_coordinates_url(latitude, longitude, today)?;
        self.get(url, today).await
    }

    pub fn timings_by_city_url(
        &self,
        city: &str,
        country: &str,
        date: NaiveDate,
    ) -> Result<Url, AppError> {
        let method = self.method.to_string();
        let school = self.school.to_string();
        self.build_url(
            "timingsByCity",
            date,
            &[
                ("city", city),
                ("country", country),
                ("method", method.as_str()),
                ("school", school.as_str()),
            ],
        )
    }

    pub fn timings_by_coordinates_url(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Result<Url, AppError> {
        let latitude = latitude.to_string();
        let longitude = longitude.to_string();
        let method = self.method.to_string();
        let school = self.school.to_string();
        self.build_url(
            "timings",
            date,
            &[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("method", method.as_str()),
                ("school", school.as_str()),
            ],
        )
    }

    fn build_url(
        &self,
        endpoint: &str,
        date: NaiveDate,
        params: &[(&str, &str)],
    ) -> Result<Url, AppError> {
        // The API wants an unpadded D-M-YYYY path segment
        let path = format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint,
            date.format("%-d-%-m-%Y")
        );
        Url::parse_with_params(&path, params)
            .map_err(|e| AppError::InvalidConfig(format!("Bad timings URL {path}: {e}")))
    }

    async fn get(&self, url: Url, date: NaiveDate) -> Result<TimingsSnapshot, AppError> {
        let response = self.http.get(url).send().await?;

        if response.status().is_success() {
            let timings_response: TimingsResponse = response.json().await?;
            if timings_response.code != 200 {
                error!(
                    "Timings API answered {} ({})",
                    timings_response.code, timings_response.status
                );
                return Err(AppError::ApiRequestFailed(format!(
                    "Timings API answered {}: {}",
                    timings_response.code, timings_response.status
                )));
            }
            debug!("Timings fetched successfully: {:?}", timings_response.data.timings);
            Ok(TimingsSnapshot::from_response(timings_response, date))
        } else {
            // Log and return error for unsuccessful responses
            error!("Failed to fetch timings: {}", response.status());
            Err(AppError::ApiRequestFailed(format!(
                "Failed to fetch timings: {}",
                response.status()
            )))
        }
    }
}

impl TimingsSource for TimingsClient {
    async fn fetch(&self, location: &Location) -> Result<TimingsSnapshot, AppError> {
        match location {
            Location::City { city, country } => self.fetch_by_city(city, country).await,
            Location::Coordinates {
                latitude,
                longitude,
            } => self.fetch_by_coordinates(*latitude, *longitude).await,
        }
    }
}

/// Snapshot built from the captured sample payload with the two anchors
/// replaced.
#[cfg(test)]
pub(crate) fn sample_snapshot(fajr: &str, maghrib: &str) -> TimingsSnapshot {
    let mut response: TimingsResponse =
        serde_json::from_str(response::SAMPLE_RESPONSE).expect("sample payload decodes");
    response.data.timings.fajr = fajr.to_string();
    response.data.timings.maghrib = maghrib.to_string();
    TimingsSnapshot::from_response(response, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> TimingsClient {
        TimingsClient::new(TIMINGS_ENDPOINT, 1, 1)
    }

    fn sample_body() -> serde_json::Value {
        serde_json::from_str(response::SAMPLE_RESPONSE).unwrap()
    }

    #[tokio::test]
    async fn fetches_city_timings_from_the_api() {
        let server = MockServer::start().await;
        let today = Local::now().date_naive();
        Mock::given(method("GET"))
            .and(path(format!(
                "/timingsByCity/{}",
                today.format("%-d-%-m-%Y")
            )))
            .and(query_param("city", "Bahawalpur"))
            .and(query_param("country", "Pakistan"))
            .and(query_param("method", "1"))
            .and(query_param("school", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let snapshot = TimingsClient::new(server.uri(), 1, 1)
            .fetch_by_city("Bahawalpur", "Pakistan")
            .await
            .unwrap();
        assert_eq!(snapshot.timings.fajr, "04:52");
        assert_eq!(snapshot.fetched_for, today);
    }

    #[tokio::test]
    async fn server_error_status_is_a_failed_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = TimingsClient::new(server.uri(), 1, 1)
            .fetch_by_city("Bahawalpur", "Pakistan")
            .await;
        match result {
            Err(AppError::ApiRequestFailed(message)) => assert!(message.contains("500")),
            other => panic!("expected ApiRequestFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_code_in_the_body_is_a_failed_request() {
        let server = MockServer::start().await;
        let mut body = sample_body();
        body["code"] = 400.into();
        body["status"] = "Bad Request".into();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let result = TimingsClient::new(server.uri(), 1, 1)
            .fetch_by_coordinates(29.3956, 71.6836)
            .await;
        match result {
            Err(AppError::ApiRequestFailed(message)) => {
                assert!(message.contains("400"));
                assert!(message.contains("Bad Request"));
            }
            other => panic!("expected ApiRequestFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_a_request_error() {
        // Bind a free port, then release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let result = TimingsClient::new(uri, 1, 1)
            .fetch_by_city("Bahawalpur", "Pakistan")
            .await;
        assert!(matches!(result, Err(AppError::RequestError(_))));
    }

    #[test]
    fn city_url_uses_unpadded_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let url = client()
            .timings_by_city_url("Bahawalpur", "Pakistan", date)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.aladhan.com/v1/timingsByCity/5-3-2026?city=Bahawalpur&country=Pakistan&method=1&school=1"
        );
    }

    #[test]
    fn city_names_are_encoded() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let url = client()
            .timings_by_city_url("Rahim Yar Khan", "Pakistan", date)
            .unwrap();
        let city = url
            .query_pairs()
            .find(|(key, _)| key == "city")
            .map(|(_, value)| value.into_owned());
        assert_eq!(city.as_deref(), Some("Rahim Yar Khan"));
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn coordinates_url() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        let url = TimingsClient::new("https://example.test/v1/", 2, 0)
            .timings_by_coordinates_url(29.3956, 71.6836, date)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.test/v1/timings/31-12-2026?latitude=29.3956&longitude=71.6836&method=2&school=0"
        );
    }

    #[test]
    fn bad_base_url_is_a_config_error() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let result = TimingsClient::new("not a url", 1, 1).timings_by_city_url("a", "b", date);
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn snapshot_is_valid_only_on_its_day() {
        let snapshot = sample_snapshot("04:52", "17:40");
        assert!(snapshot.is_valid_on(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()));
        assert!(!snapshot.is_valid_on(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()));
    }

    #[test]
    fn location_display() {
        assert_eq!(
            Location::city("Bahawalpur", "Pakistan").to_string(),
            "Bahawalpur, Pakistan"
        );
        assert_eq!(
            Location::coordinates(29.39561, 71.68361).to_string(),
            "29.3956, 71.6836"
        );
    }
}

// Module containing the response data structure of the position lookup
mod response;

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, error, info};

use crate::error::GeolocationError;
use crate::timings::Location;

// API endpoint for the ip-api.com position lookup
const POSITION_ENDPOINT: &str = "http://ip-api.com/json/?fields=status,message,lat,lon,city,country";

const POSITION_TIMEOUT: Duration = Duration::from_secs(10);

/// A resolved device position and a human-readable name for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub location: Location,
    pub label: String,
}

/// Requests the current position once.
///
/// Every call issues a fresh request and gives up after ten seconds.
///
/// # Returns
/// * `Position` with coordinates and a `city, country` label
/// * `GeolocationError` describing why no position could be determined
pub async fn locate() -> Result<Position, GeolocationError> {
    info!("Requesting device position");

    let client = reqwest::Client::builder()
        .timeout(POSITION_TIMEOUT)
        .build()
        .map_err(|e| {
            error!("Failed to build position client: {}", e);
            GeolocationError::PositionUnavailable
        })?;

    let response = client
        .get(POSITION_ENDPOINT)
        .send()
        .await
        .map_err(classify_transport_error)?;

    if !response.status().is_success() {
        error!("Failed to fetch position: {}", response.status());
        return Err(classify_status(response.status()));
    }

    let position_response: response::PositionResponse = response
        .json()
        .await
        .map_err(classify_transport_error)?;
    debug!("Position fetched: {:?}", position_response);
    position_from_response(position_response)
}

fn classify_transport_error(err: reqwest::Error) -> GeolocationError {
    error!("Position request failed: {}", err);
    if err.is_timeout() {
        GeolocationError::Timeout
    } else {
        GeolocationError::PositionUnavailable
    }
}

fn classify_status(status: StatusCode) -> GeolocationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            GeolocationError::PermissionDenied
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GeolocationError::Timeout,
        _ => GeolocationError::PositionUnavailable,
    }
}

fn position_from_response(
    response: response::PositionResponse,
) -> Result<Position, GeolocationError> {
    if response.status != "success" {
        error!(
            "Position lookup failed: {}",
            response.message.as_deref().unwrap_or("no reason given")
        );
        return Err(GeolocationError::PositionUnavailable);
    }

    let (Some(latitude), Some(longitude)) = (response.lat, response.lon) else {
        return Err(GeolocationError::PositionUnavailable);
    };

    let label = match (response.city, response.country) {
        (Some(city), Some(country)) => format!("{city}, {country}"),
        (Some(place), None) | (None, Some(place)) => place,
        (None, None) => format!("{latitude:.4}, {longitude:.4}"),
    };

    Ok(Position {
        location: Location::coordinates(latitude, longitude),
        label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> response::PositionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn success_payload_becomes_coordinates() {
        let position = position_from_response(decode(
            r#"{"status":"success","lat":29.3956,"lon":71.6836,"city":"Bahawalpur","country":"Pakistan"}"#,
        ))
        .unwrap();
        assert_eq!(position.location, Location::coordinates(29.3956, 71.6836));
        assert_eq!(position.label, "Bahawalpur, Pakistan");
    }

    #[test]
    fn label_falls_back_to_coordinates() {
        let position =
            position_from_response(decode(r#"{"status":"success","lat":1.5,"lon":-2.25}"#))
                .unwrap();
        assert_eq!(position.label, "1.5000, -2.2500");
    }

    #[test]
    fn fail_payload_is_unavailable() {
        let result = position_from_response(decode(
            r#"{"status":"fail","message":"private range"}"#,
        ));
        assert_eq!(result, Err(GeolocationError::PositionUnavailable));
    }

    #[test]
    fn status_codes_map_to_reasons() {
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN),
            GeolocationError::PermissionDenied
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            GeolocationError::PermissionDenied
        );
        assert_eq!(
            classify_status(StatusCode::GATEWAY_TIMEOUT),
            GeolocationError::Timeout
        );
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            GeolocationError::PositionUnavailable
        );
    }
}

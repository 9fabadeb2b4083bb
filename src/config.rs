use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;
use crate::timings::{Location, TIMINGS_ENDPOINT};

pub const VAR_CITY: &str = "ASSAWM_CITY";
pub const VAR_COUNTRY: &str = "ASSAWM_COUNTRY";
pub const VAR_LATITUDE: &str = "ASSAWM_LATITUDE";
pub const VAR_LONGITUDE: &str = "ASSAWM_LONGITUDE";
pub const VAR_API_BASE: &str = "ASSAWM_API_BASE";
pub const VAR_METHOD: &str = "ASSAWM_METHOD";
pub const VAR_SCHOOL: &str = "ASSAWM_SCHOOL";
pub const VAR_HIJRI_ADJUSTMENT: &str = "ASSAWM_HIJRI_ADJUSTMENT";
pub const VAR_DUA_AUTO_CLOSE_SECS: &str = "ASSAWM_DUA_AUTO_CLOSE_SECS";

const DEFAULT_CITY: &str = "Bahawalpur";
const DEFAULT_COUNTRY: &str = "Pakistan";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub location: Location,
    pub api_base: String,
    /// AlAdhan calculation method id
    pub method: u8,
    /// 0 = Shafi, 1 = Hanafi
    pub school: u8,
    /// Days added to the provider's Hijri day before display
    pub hijri_adjustment: i32,
    pub dua_auto_close: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let latitude = parse_var::<f64>(&lookup, VAR_LATITUDE)?;
        let longitude = parse_var::<f64>(&lookup, VAR_LONGITUDE)?;

        // Coordinates supersede the named city
        let location = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => {
                if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                    return Err(AppError::InvalidConfig(format!(
                        "Coordinates out of range: {latitude}, {longitude}"
                    )));
                }
                Location::coordinates(latitude, longitude)
            }
            (None, None) => Location::city(
                lookup(VAR_CITY).unwrap_or_else(|| DEFAULT_CITY.to_string()),
                lookup(VAR_COUNTRY).unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            ),
            _ => {
                return Err(AppError::InvalidConfig(format!(
                    "{VAR_LATITUDE} and {VAR_LONGITUDE} must be set together"
                )));
            }
        };

        Ok(Config {
            location,
            api_base: lookup(VAR_API_BASE).unwrap_or_else(|| TIMINGS_ENDPOINT.to_string()),
            method: parse_var(&lookup, VAR_METHOD)?.unwrap_or(1),
            school: parse_var(&lookup, VAR_SCHOOL)?.unwrap_or(1),
            hijri_adjustment: parse_var(&lookup, VAR_HIJRI_ADJUSTMENT)?.unwrap_or(-1),
            dua_auto_close: Duration::from_secs(
                parse_var(&lookup, VAR_DUA_AUTO_CLOSE_SECS)?.unwrap_or(60),
            ),
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, AppError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::InvalidConfig(format!("{name}={raw:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.location, Location::city("Bahawalpur", "Pakistan"));
        assert_eq!(config.api_base, "https://api.aladhan.com/v1");
        assert_eq!((config.method, config.school), (1, 1));
        assert_eq!(config.hijri_adjustment, -1);
        assert_eq!(config.dua_auto_close, Duration::from_secs(60));
    }

    #[test]
    fn coordinates_supersede_city() {
        let config = config(&[
            (VAR_CITY, "Lahore"),
            (VAR_LATITUDE, "31.5204"),
            (VAR_LONGITUDE, " 74.3587 "),
        ])
        .unwrap();
        assert_eq!(config.location, Location::coordinates(31.5204, 74.3587));
    }

    #[test]
    fn half_a_coordinate_pair_is_rejected() {
        let result = config(&[(VAR_LATITUDE, "31.5")]);
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(matches!(
            config(&[(VAR_METHOD, "karachi")]),
            Err(AppError::InvalidConfig(_))
        ));
        assert!(matches!(
            config(&[(VAR_LATITUDE, "91"), (VAR_LONGITUDE, "0")]),
            Err(AppError::InvalidConfig(_))
        ));
    }
}

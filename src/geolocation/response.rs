/// Response structure for the ip-api.com JSON endpoint
/// A `"success"` status carries the coordinates, `"fail"` carries a message
#[derive(serde::Deserialize, Debug)]
pub struct PositionResponse {
    /// "success" or "fail"
    pub status: String,
    /// Failure reason, e.g. "private range" or "reserved range"
    pub message: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
}

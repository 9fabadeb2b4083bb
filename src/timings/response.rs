use serde::Deserialize;

/// Envelope returned by both AlAdhan timings endpoints
/// (`/timingsByCity/{date}` and `/timings/{date}`)
#[derive(Deserialize, Debug, Clone)]
pub struct TimingsResponse {
    /// Mirrors the HTTP status, 200 on success
    pub code: u16,
    /// "OK" on success, an error description otherwise
    pub status: String,
    pub data: TimingsData,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TimingsData {
    pub timings: Timings,
    pub date: DateInfo,
    pub meta: Meta,
}

/// Named prayer events for one day, each as `HH:MM` optionally followed by
/// a `(TZ)` annotation
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Timings {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub sunset: String,
    pub maghrib: String,
    pub isha: String,
    pub imsak: String,
    pub midnight: String,
    pub firstthird: String,
    pub lastthird: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DateInfo {
    /// e.g. "16 Oct 2026"
    pub readable: String,
    pub gregorian: GregorianDate,
    pub hijri: HijriDate,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GregorianDate {
    pub day: String,
    pub weekday: Weekday,
    pub month: Month,
}

#[derive(Deserialize, Debug, Clone)]
pub struct HijriDate {
    /// Day of the month, as a string ("1" to "30")
    pub day: String,
    pub month: HijriMonth,
    pub year: String,
    pub designation: Designation,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Weekday {
    pub en: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Month {
    pub en: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct HijriMonth {
    pub en: String,
    pub ar: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Designation {
    /// "AH" for Hijri dates
    pub abbreviated: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Meta {
    /// IANA zone name, e.g. "Asia/Karachi"
    pub timezone: String,
    pub method: Option<Method>,
    /// "STANDARD" (Shafi) or "HANAFI"
    pub school: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Method {
    pub name: String,
}

/// Payload captured from `GET /v1/timingsByCity/16-10-2026?city=Bahawalpur&country=Pakistan&method=1&school=1`
#[cfg(test)]
pub(crate) const SAMPLE_RESPONSE: &str = r#"{
  "code": 200,
  "status": "OK",
  "data": {
    "timings": {
      "Fajr": "04:52",
      "Sunrise": "06:11",
      "Dhuhr": "11:56",
      "Asr": "15:58",
      "Sunset": "17:40",
      "Maghrib": "17:40",
      "Isha": "18:59",
      "Imsak": "04:42",
      "Midnight": "23:56",
      "Firstthird": "21:57",
      "Lastthird": "01:54"
    },
    "date": {
      "readable": "16 Oct 2026",
      "timestamp": "1791859200",
      "hijri": {
        "date": "05-05-1448",
        "format": "DD-MM-YYYY",
        "day": "05",
        "weekday": { "en": "Al Juma'a", "ar": "الجمعة" },
        "month": { "number": 5, "en": "Jumādá al-ūlá", "ar": "جُمادى الأولى", "days": 30 },
        "year": "1448",
        "designation": { "abbreviated": "AH", "expanded": "Anno Hegirae" },
        "holidays": []
      },
      "gregorian": {
        "date": "16-10-2026",
        "format": "DD-MM-YYYY",
        "day": "16",
        "weekday": { "en": "Friday" },
        "month": { "number": 10, "en": "October" },
        "year": "2026",
        "designation": { "abbreviated": "AD", "expanded": "Anno Domini" }
      }
    },
    "meta": {
      "latitude": 29.3956,
      "longitude": 71.6836,
      "timezone": "Asia/Karachi",
      "method": {
        "id": 1,
        "name": "University of Islamic Sciences, Karachi",
        "params": { "Fajr": 18, "Isha": 18 }
      },
      "latitudeAdjustmentMethod": "ANGLE_BASED",
      "midnightMode": "STANDARD",
      "school": "HANAFI",
      "offset": {}
    }
  }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_captured_payload() {
        let response: TimingsResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        assert_eq!(response.code, 200);
        assert_eq!(response.data.timings.fajr, "04:52");
        assert_eq!(response.data.timings.firstthird, "21:57");
        assert_eq!(response.data.date.hijri.month.ar, "جُمادى الأولى");
        assert_eq!(response.data.date.gregorian.weekday.en, "Friday");
        assert_eq!(response.data.meta.timezone, "Asia/Karachi");
        assert_eq!(response.data.meta.school, "HANAFI");
        assert_eq!(response.data.date.hijri.designation.abbreviated, "AH");
    }
}

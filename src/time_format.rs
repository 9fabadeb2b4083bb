//! Conversions of the provider's 24-hour `HH:MM` strings into display forms.
//!
//! Timings arrive as `"05:12"` or `"05:12 (PKT)"`. The parenthetical
//! annotation is dropped before anything else happens.

use chrono::NaiveTime;

use crate::error::AppError;

/// A parsed time of day. The minute text is kept exactly as it arrived so
/// display strings preserve the source's leading zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay<'a> {
    pub hour: u32,
    pub minute: &'a str,
}

impl TimeOfDay<'_> {
    /// Numeric minute value in `[0, 59]`.
    pub fn minute_value(&self) -> Result<u32, AppError> {
        match self.minute.parse::<u32>() {
            Ok(minute) if minute < 60 => Ok(minute),
            _ => Err(AppError::TimeParse(format!("{}:{}", self.hour, self.minute))),
        }
    }

    pub fn to_naive_time(&self) -> Result<NaiveTime, AppError> {
        let minute = self.minute_value()?;
        NaiveTime::from_hms_opt(self.hour, minute, 0)
            .ok_or_else(|| AppError::TimeParse(format!("{}:{}", self.hour, self.minute)))
    }

    fn twelve_hour(&self) -> u32 {
        match self.hour % 12 {
            0 => 12,
            hour => hour,
        }
    }

    fn period(&self) -> &'static str {
        if self.hour < 12 { "AM" } else { "PM" }
    }
}

/// Drops a trailing `(TZ)` annotation and surrounding whitespace.
pub fn strip_annotation(s: &str) -> &str {
    match s.find('(') {
        Some(idx) => s[..idx].trim(),
        None => s.trim(),
    }
}

/// Splits `HH:MM` into its hour and minute parts. The hour must be in `[0, 23]`.
pub fn parse(s: &str) -> Result<TimeOfDay<'_>, AppError> {
    let clean = strip_annotation(s);
    let (hour, minute) = clean
        .split_once(':')
        .ok_or_else(|| AppError::TimeParse(s.to_string()))?;

    let hour = hour.trim();
    if hour.is_empty() || !hour.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::TimeParse(s.to_string()));
    }
    let hour = match hour.parse::<u32>() {
        Ok(hour) if hour < 24 => hour,
        _ => return Err(AppError::TimeParse(s.to_string())),
    };
    let minute = minute.trim();
    if minute.is_empty() {
        return Err(AppError::TimeParse(s.to_string()));
    }

    Ok(TimeOfDay { hour, minute })
}

/// `"13:30"` becomes `"1:30 PM"`. Empty input gives an empty string.
pub fn to_12_hour(s: &str) -> Result<String, AppError> {
    if s.trim().is_empty() {
        return Ok(String::new());
    }
    let time = parse(s)?;
    Ok(format!("{}:{} {}", time.twelve_hour(), time.minute, time.period()))
}

/// Two-digit hour variant used on the sunrise/sunset card: `"05:12 AM"`.
pub fn to_12_hour_padded(s: &str) -> Result<String, AppError> {
    if s.trim().is_empty() {
        return Ok(String::new());
    }
    let time = parse(s)?;
    Ok(format!("{:02}:{} {}", time.twelve_hour(), time.minute, time.period()))
}

/// Period-less variant used in the prayer list: `"18:40"` becomes `"6:40"`.
pub fn to_12_hour_bare(s: &str) -> Result<String, AppError> {
    if s.trim().is_empty() {
        return Ok(String::new());
    }
    let time = parse(s)?;
    Ok(format!("{}:{}", time.twelve_hour(), time.minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_twelve_hour_clock() {
        assert_eq!(to_12_hour("00:05").unwrap(), "12:05 AM");
        assert_eq!(to_12_hour("13:30").unwrap(), "1:30 PM");
        assert_eq!(to_12_hour("23:59").unwrap(), "11:59 PM");
        assert_eq!(to_12_hour("12:00").unwrap(), "12:00 PM");
        assert_eq!(to_12_hour("05:12 (PKT)").unwrap(), "5:12 AM");
    }

    #[test]
    fn never_renders_hour_zero() {
        for hour in 0..24 {
            let formatted = to_12_hour(&format!("{hour:02}:07")).unwrap();
            let (display_hour, rest) = formatted.split_once(':').unwrap();
            let display_hour: u32 = display_hour.parse().unwrap();
            assert!((1..=12).contains(&display_hour), "{formatted}");

            if display_hour == 12 {
                let expected = if hour == 0 { "AM" } else { "PM" };
                assert!(rest.ends_with(expected), "{formatted}");
            }
            if hour >= 12 {
                assert!(rest.ends_with("PM"), "{formatted}");
            }
        }
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(to_12_hour("").unwrap(), "");
        assert_eq!(to_12_hour_padded("  ").unwrap(), "");
        assert_eq!(to_12_hour_bare("").unwrap(), "");
    }

    #[test]
    fn padded_and_bare_styles() {
        assert_eq!(to_12_hour_padded("05:12 (PKT)").unwrap(), "05:12 AM");
        assert_eq!(to_12_hour_padded("18:40").unwrap(), "06:40 PM");
        assert_eq!(to_12_hour_bare("18:40").unwrap(), "6:40");
        assert_eq!(to_12_hour_bare("00:15").unwrap(), "12:15");
    }

    #[test]
    fn minute_text_is_kept_verbatim() {
        let time = parse("04:05 (PKT)").unwrap();
        assert_eq!(time, TimeOfDay { hour: 4, minute: "05" });
        assert_eq!(time.minute_value().unwrap(), 5);
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        for input in ["ab:cd", "24:00", "0500", "07:", "-1:30"] {
            assert!(
                matches!(to_12_hour(input), Err(AppError::TimeParse(_))),
                "{input}"
            );
        }
        assert!(parse("07:75").unwrap().to_naive_time().is_err());
    }

    #[test]
    fn hour_must_be_plain_digits() {
        for input in ["+5:30", "+05:30", " +5:30 (PKT)", "٥:30", "0x5:30"] {
            assert!(
                matches!(parse(input), Err(AppError::TimeParse(_))),
                "{input}"
            );
        }
        assert_eq!(parse(" 5:30 ").unwrap().hour, 5);
    }
}

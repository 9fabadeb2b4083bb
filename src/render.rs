//! Plain-text rendering of the dashboard panels.

use chrono::NaiveDateTime;

use crate::countdown::{UrgencyStatus, format_remaining};
use crate::dua::{DuaContent, DuaTab};
use crate::error::AppError;
use crate::time_format;
use crate::timings::TimingsSnapshot;

const LOADING: &str = "...";
const UNKNOWN_TIME: &str = "--:--";

/// Hijri date line, shifted by `adjustment` days. A shift that lands before
/// the first of the month reads "Adjusting!" instead of a date.
pub fn header(snapshot: Option<&TimingsSnapshot>, adjustment: i32) -> String {
    let Some(snapshot) = snapshot else {
        return LOADING.to_string();
    };
    let hijri = &snapshot.date.hijri;

    let headline = match hijri.day.trim().parse::<i32>() {
        Ok(day) if day + adjustment < 1 => "Adjusting!".to_string(),
        Ok(day) => format!("{} {}, {}", day + adjustment, hijri.month.en, hijri.year),
        Err(_) => format!("{} {}, {}", hijri.day, hijri.month.en, hijri.year),
    };
    format!(
        "{headline}\n{} {} {}",
        hijri.month.ar, hijri.year, hijri.designation.abbreviated
    )
}

/// Live clock plus the Gregorian date of the snapshot.
pub fn clock(now: NaiveDateTime, snapshot: Option<&TimingsSnapshot>) -> String {
    let time = now.format("%I:%M %p");
    match snapshot {
        Some(snapshot) => {
            let gregorian = &snapshot.date.gregorian;
            format!(
                "{time}\n{}, {} {}",
                gregorian.weekday.en, gregorian.day, gregorian.month.en
            )
        }
        None => format!("{time}\n{LOADING}"),
    }
}

pub fn sun_card(label: &str, snapshot: Option<&TimingsSnapshot>) -> String {
    let Some(snapshot) = snapshot else {
        return format!("{}\n{LOADING}", label.to_uppercase());
    };
    let timings = &snapshot.timings;
    format!(
        "{}\nSunrise  {}\nSunset   {}",
        label.to_uppercase(),
        display_or_unknown(time_format::to_12_hour_padded(&timings.sunrise)),
        display_or_unknown(time_format::to_12_hour_padded(&timings.sunset)),
    )
}

/// The five daily prayers in 12-hour form without a period.
pub fn prayer_list(snapshot: Option<&TimingsSnapshot>) -> String {
    let Some(snapshot) = snapshot else {
        return LOADING.to_string();
    };
    let timings = &snapshot.timings;
    let prayers = [
        ("Fajr", &timings.fajr),
        ("Dhuhr", &timings.dhuhr),
        ("Asr", &timings.asr),
        ("Maghrib", &timings.maghrib),
        ("Isha", &timings.isha),
    ];

    prayers
        .iter()
        .map(|(label, time)| {
            format!(
                "{label} {}",
                display_or_unknown(time_format::to_12_hour_bare(time))
            )
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Every named event of the day in chronological order, with the
/// calculation details underneath.
pub fn all_timings(snapshot: Option<&TimingsSnapshot>) -> String {
    let Some(snapshot) = snapshot else {
        return LOADING.to_string();
    };
    let timings = &snapshot.timings;
    let events = [
        ("Imsak", &timings.imsak),
        ("Fajr", &timings.fajr),
        ("Sunrise", &timings.sunrise),
        ("Dhuhr", &timings.dhuhr),
        ("Asr", &timings.asr),
        ("Sunset", &timings.sunset),
        ("Maghrib", &timings.maghrib),
        ("Isha", &timings.isha),
        ("Firstthird", &timings.firstthird),
        ("Midnight", &timings.midnight),
        ("Lastthird", &timings.lastthird),
    ];

    let mut lines = vec![format!(
        "Timings for {} ({})",
        snapshot.date.readable, snapshot.meta.timezone
    )];
    lines.extend(events.iter().map(|(label, time)| {
        format!(
            "{label:<11}{}",
            display_or_unknown(time_format::to_12_hour(time))
        )
    }));
    lines.push(match &snapshot.meta.method {
        Some(method) => format!("{}, {} school", method.name, snapshot.meta.school),
        None => format!("{} school", snapshot.meta.school),
    });
    lines.join("\n")
}

pub fn banner(status: UrgencyStatus) -> Option<String> {
    match status {
        UrgencyStatus::Clear => None,
        UrgencyStatus::Approaching { kind, remaining } => Some(format!(
            "{}\n{}\nOnly 2 minutes remaining...",
            kind.headline().to_uppercase(),
            format_remaining(remaining)
        )),
    }
}

pub fn dua(tab: Option<DuaTab>) -> String {
    let mut out = String::new();
    let tabs = DuaTab::ALL
        .iter()
        .map(|t| {
            if Some(*t) == tab {
                format!("[{t}]")
            } else {
                format!(" {t} ")
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&tabs);

    match tab.map(|t| t.content()) {
        None => {}
        Some(DuaContent::Dua(dua)) => out.push_str(&format!(
            "\n\n{}\n{}\n{}\n{}",
            dua.title, dua.arabic, dua.urdu, dua.english
        )),
        Some(DuaContent::Note(note)) => {
            out.push_str(&format!("\n\nRamadan Note\n\"{note}\""));
        }
    }
    out
}

fn display_or_unknown(formatted: Result<String, AppError>) -> String {
    formatted.unwrap_or_else(|_| UNKNOWN_TIME.to_string())
}

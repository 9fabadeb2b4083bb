use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuaTab {
    Sehri,
    Aftari,
    Note,
}

impl DuaTab {
    pub const ALL: [DuaTab; 3] = [DuaTab::Sehri, DuaTab::Aftari, DuaTab::Note];

    pub fn title(&self) -> &'static str {
        match self {
            DuaTab::Sehri => "Dua e Sehri",
            DuaTab::Aftari => "Dua e Aftari",
            DuaTab::Note => "Note!",
        }
    }

    pub fn content(&self) -> DuaContent {
        match self {
            DuaTab::Sehri => DuaContent::Dua(&SEHRI),
            DuaTab::Aftari => DuaContent::Dua(&AFTARI),
            DuaTab::Note => DuaContent::Note(RAMADAN_NOTE),
        }
    }
}

impl fmt::Display for DuaTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for DuaTab {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sehri" => Ok(DuaTab::Sehri),
            "aftari" | "iftar" | "iftari" => Ok(DuaTab::Aftari),
            "note" => Ok(DuaTab::Note),
            other => Err(AppError::MissingParameter(format!(
                "dua tab must be sehri, aftari or note, got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Dua {
    pub title: &'static str,
    pub arabic: &'static str,
    pub urdu: &'static str,
    pub english: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuaContent {
    Dua(&'static Dua),
    Note(&'static str),
}

pub static SEHRI: Dua = Dua {
    title: "Dua for Sehri (Intention for Fast)",
    arabic: "وَبِصَوْمِ غَدٍ نَّوَيْتُ مِنْ شَهْرِ رَمَضَانَ",
    urdu: "اور میں نے ماہ رمضان کے کل کے روزے کی نیت کی۔",
    english: "I intend to keep the fast for tomorrow in the month of Ramadan.",
};

pub static AFTARI: Dua = Dua {
    title: "Dua for Iftar (Breaking Fast)",
    arabic: "اللَّهُمَّ اِنِّى لَكَ صُمْتُ وَبِكَ اَمَنْتُ وَعَلَيْكَ تَوَكَّلْتُ وَعَلَى رِزْقِكَ اَفْطَرْتُ",
    urdu: "اے اللہ! میں نے تیرے لیے روزہ رکھا اور تیرے اوپر ایمان لایا اور تجھ پر بھروسہ کیا اور تیرے رزق سے افطار کیا۔",
    english: "O Allah! I fasted for You and I believe in You and I put my trust in You and I break my fast with Your sustenance.",
};

pub const RAMADAN_NOTE: &str = "May this holy month of Ramadan bring you closer to Allah. \
Remember the less fortunate in your prayers and charity. \
May your fasts be accepted and your sins forgiven. Ameen.";

/// Which dua tab is open. An opened tab closes by itself once
/// `auto_close` has elapsed.
#[derive(Debug, Clone)]
pub struct DuaTabs {
    open: Option<(DuaTab, Instant)>,
    auto_close: Duration,
}

impl DuaTabs {
    /// Starts with the Sehri tab open.
    pub fn new(auto_close: Duration, now: Instant) -> Self {
        DuaTabs {
            open: Some((DuaTab::Sehri, now)),
            auto_close,
        }
    }

    /// Opens `tab`, restarting the auto-close window.
    pub fn select(&mut self, tab: DuaTab, now: Instant) {
        self.open = Some((tab, now));
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn active(&self, now: Instant) -> Option<DuaTab> {
        let (tab, opened_at) = self.open?;
        (now.saturating_duration_since(opened_at) < self.auto_close).then_some(tab)
    }
}

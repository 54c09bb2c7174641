//! Badges, result grades and combo tiers

use serde::{Deserialize, Serialize};

/// Milestone badges unlocked by level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Badge {
    BintangHafalan,
    PejuangHafalan,
    HafidzCilik,
    MasterQuran,
}

impl Badge {
    /// Every badge, lowest threshold first
    pub const ALL: [Badge; 4] =
        [Badge::BintangHafalan, Badge::PejuangHafalan, Badge::HafidzCilik, Badge::MasterQuran];

    /// Level at which this badge unlocks
    pub fn threshold(self) -> u32 {
        match self {
            Badge::BintangHafalan => 3,
            Badge::PejuangHafalan => 5,
            Badge::HafidzCilik => 10,
            Badge::MasterQuran => 15,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Badge::BintangHafalan => "Bintang Hafalan",
            Badge::PejuangHafalan => "Pejuang Hafalan",
            Badge::HafidzCilik => "Hafidz Cilik",
            Badge::MasterQuran => "Master Quran",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Badge::BintangHafalan => "🌟",
            Badge::PejuangHafalan => "🏆",
            Badge::HafidzCilik => "👑",
            Badge::MasterQuran => "💎",
        }
    }

    /// All badges held at `level`. Lower badges stay unlocked.
    pub fn unlocked(level: u32) -> Vec<Badge> {
        Self::ALL.into_iter().filter(|b| level >= b.threshold()).collect()
    }

    /// The badge that unlocks exactly at `level`, if any
    pub fn unlocked_at(level: u32) -> Option<Badge> {
        Self::ALL.into_iter().find(|b| b.threshold() == level)
    }
}

/// Grade shown on the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultGrade {
    Mumtaz,
    JayyidJiddan,
    Jayyid,
    TetapSemangat,
}

impl ResultGrade {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            80.. => ResultGrade::Mumtaz,
            60..80 => ResultGrade::JayyidJiddan,
            40..60 => ResultGrade::Jayyid,
            _ => ResultGrade::TetapSemangat,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ResultGrade::Mumtaz => "Mumtaz!",
            ResultGrade::JayyidJiddan => "Jayyid Jiddan!",
            ResultGrade::Jayyid => "Jayyid!",
            ResultGrade::TetapSemangat => "Tetap Semangat!",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ResultGrade::Mumtaz => "Hafalanmu lancar sekali. Naik level!",
            ResultGrade::JayyidJiddan => "Bagus! Terus berlatih ya.",
            ResultGrade::Jayyid => "Ayo perbanyak murojaah.",
            ResultGrade::TetapSemangat => "Murojaah lagi yuk!",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ResultGrade::Mumtaz => "🏆",
            ResultGrade::JayyidJiddan => "🌟",
            ResultGrade::Jayyid => "💪",
            ResultGrade::TetapSemangat => "📖",
        }
    }
}

/// Streak feedback tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboTier {
    Combo,
    SuperCombo,
    OnFire,
}

impl ComboTier {
    /// Tier for a streak, `None` below three in a row
    pub fn from_streak(streak: u32) -> Option<Self> {
        match streak {
            10.. => Some(ComboTier::OnFire),
            5..10 => Some(ComboTier::SuperCombo),
            3..5 => Some(ComboTier::Combo),
            _ => None,
        }
    }

    /// Banner text for a streak in this tier
    pub fn banner(self, streak: u32) -> String {
        match self {
            ComboTier::Combo => format!("COMBO x{streak}!"),
            ComboTier::SuperCombo => format!("⚡ COMBO x{streak}! ⚡"),
            ComboTier::OnFire => format!("🔥 ON FIRE x{streak}! 🔥"),
        }
    }
}

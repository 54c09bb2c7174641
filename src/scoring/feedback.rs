//! Encouragement lines shown after an answer

use rand::Rng;
use rand::seq::SliceRandom;

const CORRECT: &[&str] = &[
    "MasyaAllah, hebat sekali!",
    "SubhanAllah, hafalanmu mantap!",
    "Tabarakallah, lanjutkan!",
    "Alhamdulillah, benar!",
    "Barakallah, kamu pintar!",
    "Keren! Ayo terus!",
];

const COMBO: &[&str] = &[
    "{streak} kali berturut-turut!",
    "Luar biasa, combo {streak}!",
    "Belum ada yang salah: {streak} benar!",
];

const INCORRECT: &[&str] = &[
    "Belum tepat, coba lagi ya!",
    "Tidak apa-apa, terus murojaah!",
    "Hampir! Perhatikan ayat berikutnya.",
];

const TIMED_OUT: &[&str] = &["Waktu habis!", "Yuk, lebih cepat lagi!"];

const LEVEL_UP: &[&str] = &["Selamat, level naik!", "Hebat, kamu naik level!", "Mantap, level baru!"];

/// Which moment the line is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Correct,
    /// A correct answer that extended a streak of three or more
    Combo(u32),
    Incorrect,
    TimedOut,
    LevelUp,
}

/// Pick an encouragement line for `kind`
pub fn motivational_message<R: Rng + ?Sized>(kind: MessageKind, rng: &mut R) -> String {
    let (pool, streak) = match kind {
        MessageKind::Correct => (CORRECT, None),
        MessageKind::Combo(streak) => (COMBO, Some(streak)),
        MessageKind::Incorrect => (INCORRECT, None),
        MessageKind::TimedOut => (TIMED_OUT, None),
        MessageKind::LevelUp => (LEVEL_UP, None),
    };

    let line = pool.choose(rng).copied().unwrap_or_default();
    match streak {
        Some(streak) => line.replace("{streak}", &streak.to_string()),
        None => line.to_string(),
    }
}

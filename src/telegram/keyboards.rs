//! Inline keyboards and callback-data round trips.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::fetch::QualityTier;

/// Callback identifier for a tier button. The reverse mapping is
/// [`tier_from_callback`]; handlers ignore anything else.
pub fn callback_data(tier: QualityTier) -> &'static str {
    match tier {
        QualityTier::Audio => "quality_audio",
        QualityTier::P360 => "quality_360",
        QualityTier::P720 => "quality_720",
        QualityTier::P1080 => "quality_1080",
        QualityTier::Best => "quality_best",
    }
}

/// Parses a pressed button back into a tier.
pub fn tier_from_callback(data: &str) -> Option<QualityTier> {
    match data {
        "quality_audio" => Some(QualityTier::Audio),
        "quality_360" => Some(QualityTier::P360),
        "quality_720" => Some(QualityTier::P720),
        "quality_1080" => Some(QualityTier::P1080),
        "quality_best" => Some(QualityTier::Best),
        _ => None,
    }
}

/// The quality menu shown under a submitted link.
pub fn quality_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("🎧 Аудио", callback_data(QualityTier::Audio)),
            InlineKeyboardButton::callback("360p", callback_data(QualityTier::P360)),
        ],
        vec![
            InlineKeyboardButton::callback("720p", callback_data(QualityTier::P720)),
            InlineKeyboardButton::callback("1080p", callback_data(QualityTier::P1080)),
        ],
        vec![InlineKeyboardButton::callback(
            "✨ Лучшее качество",
            callback_data(QualityTier::Best),
        )],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_data_round_trip() {
        let tiers = [
            QualityTier::Audio,
            QualityTier::P360,
            QualityTier::P720,
            QualityTier::P1080,
            QualityTier::Best,
        ];

        for tier in tiers {
            assert_eq!(tier_from_callback(callback_data(tier)), Some(tier));
        }
    }

    #[test]
    fn test_foreign_callback_data_is_ignored() {
        for data in ["format:mp3", "quality_4k", "", "quality_"] {
            assert_eq!(tier_from_callback(data), None, "data: {:?}", data);
        }
    }

    #[test]
    fn test_keyboard_covers_every_tier() {
        let keyboard = quality_keyboard();
        let buttons: usize = keyboard.inline_keyboard.iter().map(|row| row.len()).sum();
        assert_eq!(buttons, 5);
    }
}

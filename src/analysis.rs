//! Delivery-score inference from model replies
//!
//! Keyword heuristics over the coach's free-text feedback, surfaced as a
//! presentation event. Purely decorative: nothing downstream depends on
//! these numbers, and replies without matching keywords produce no scores.

use serde::{Deserialize, Serialize};

const STRONG_SCORE: u8 = 90;
const WEAK_SCORE: u8 = 55;

/// Scores (0-100) for the delivery metrics the coach comments on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryScores {
    pub posture: Option<u8>,
    pub eye_contact: Option<u8>,
    pub gestures: Option<u8>,
    pub confidence: Option<u8>,
}

impl DeliveryScores {
    pub fn is_empty(&self) -> bool {
        self.posture.is_none()
            && self.eye_contact.is_none()
            && self.gestures.is_none()
            && self.confidence.is_none()
    }
}

/// Scan a model reply for delivery feedback.
pub fn score_reply(text: &str) -> DeliveryScores {
    let lower = text.to_lowercase();
    let mut scores = DeliveryScores::default();

    if lower.contains("posture") {
        scores.posture = grade(&lower, &["great", "good", "confident"], &["slouch", "improve"]);
    }

    if lower.contains("eye contact") || lower.contains("eyes") {
        scores.eye_contact = grade(&lower, &["great", "good", "maintain"], &["avoid", "look away"]);
    }

    if lower.contains("gesture") || lower.contains("hands") {
        scores.gestures = grade(&lower, &["great", "effective", "good"], &["excessive", "still"]);
    }

    if lower.contains("confident") || lower.contains("confidence") {
        scores.confidence = grade(&lower, &["great", "strong", "show"], &["nervous", "uncertain"]);
    }

    scores
}

fn grade(lower: &str, positive: &[&str], negative: &[&str]) -> Option<u8> {
    if positive.iter().any(|word| lower.contains(word)) {
        Some(STRONG_SCORE)
    } else if negative.iter().any(|word| lower.contains(word)) {
        Some(WEAK_SCORE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_feedback_scores_high() {
        let scores = score_reply("Great posture and good eye contact today!");
        assert_eq!(scores.posture, Some(STRONG_SCORE));
        assert_eq!(scores.eye_contact, Some(STRONG_SCORE));
        assert_eq!(scores.gestures, None);
    }

    #[test]
    fn test_negative_feedback_scores_low() {
        let scores = score_reply("Try not to slouch; your posture suffers and you seem nervous, \
                                  lacking confidence.");
        assert_eq!(scores.posture, Some(WEAK_SCORE));
        assert_eq!(scores.confidence, Some(WEAK_SCORE));
    }

    #[test]
    fn test_unrelated_text_yields_nothing() {
        let scores = score_reply("Your argument about regulation was well structured.");
        assert!(scores.is_empty());
    }

    #[test]
    fn test_metric_mentioned_without_sentiment() {
        let scores = score_reply("Let's talk about posture next time.");
        assert_eq!(scores.posture, None);
        assert!(scores.is_empty());
    }
}

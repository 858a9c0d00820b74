use crate::model::signal::{Decision, Signal};

/// Combine the three predictor verdicts into one posture.
///
/// Long when the Bullish count reaches `vote_threshold`; the `>=` comparison
/// deliberately resolves a count exactly at the threshold to Long.
pub fn decide(
    trend: Signal,
    classifier: Signal,
    regime: Signal,
    vote_threshold: u32,
) -> Decision {
    if bullish_count(trend, classifier, regime) >= vote_threshold {
        Decision::Long
    } else {
        Decision::Flat
    }
}

/// Bullish count, reported alongside the decision in the run summary.
pub fn bullish_count(trend: Signal, classifier: Signal, regime: Signal) -> u32 {
    [trend, classifier, regime]
        .iter()
        .filter(|signal| signal.is_bullish())
        .count() as u32
}

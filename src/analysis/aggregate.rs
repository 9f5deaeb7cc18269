use crate::pipeline::TiltEstimate;

pub const NO_RELIABLE_WARNING: &str = "no reliable measurements";

/// Running sums over the reliable subset of a batch
#[derive(Debug, Clone, Copy, Default)]
struct ReliableSums {
    count: usize,
    confidence: f64,
    lines: usize,
}

/// Fold per-image estimates into one confidence-weighted estimate.
///
/// Only estimates with `confidence >= reliable_threshold` contribute. With no
/// reliable estimate the result is a zero-tilt, zero-confidence estimate with
/// a warning.
pub fn aggregate(estimates: &[TiltEstimate], reliable_threshold: f64) -> TiltEstimate {
    let reliable: Vec<&TiltEstimate> = estimates
        .iter()
        .filter(|estimate| estimate.is_reliable(reliable_threshold))
        .collect();

    let sums = reliable.iter().fold(ReliableSums::default(), |acc, estimate| ReliableSums {
        count: acc.count + 1,
        confidence: acc.confidence + estimate.confidence,
        lines: acc.lines + estimate.line_count,
    });

    if sums.count == 0 || sums.confidence <= 0.0 {
        return TiltEstimate::degraded(NO_RELIABLE_WARNING);
    }

    // Normalizing each weight first keeps a lone estimate's values bit-exact.
    let (vertical, horizontal) = reliable.iter().fold((0.0, 0.0), |(v, h), estimate| {
        let weight = estimate.confidence / sums.confidence;
        (
            v + estimate.corrected_vertical * weight,
            h + estimate.corrected_horizontal * weight,
        )
    });
    let confidence = (sums.confidence / sums.count as f64).min(1.0);

    TiltEstimate::aggregate(vertical, horizontal, confidence, sums.lines)
}

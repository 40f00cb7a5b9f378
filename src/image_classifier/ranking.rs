use crate::image_classifier::interface::{Classification, ClassificationOutput};

pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return scores.to_vec();
    }
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

/// Keeps scores at or above `threshold`, highest first, at most `max_results`.
pub fn top_classifications(
    scores: &[f32],
    labels: &[String],
    threshold: f32,
    max_results: usize,
) -> ClassificationOutput {
    let mut predictions: Vec<(usize, f32)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| *score >= threshold)
        .collect();

    predictions.sort_by(|a, b| b.1.total_cmp(&a.1));
    predictions.truncate(max_results);

    let classifications = predictions
        .into_iter()
        .map(|(index, confidence)| Classification {
            label: labels
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("unknown {}", index)),
            confidence,
        })
        .collect();

    ClassificationOutput::new(classifications)
}

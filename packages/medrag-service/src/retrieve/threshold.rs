use medrag_config::Threshold;

use crate::{retrieve::ThresholdStage, scoring};

/// Indices of the documents kept by the first stage of the cascade that keeps anything, best
/// first, at most `top_k` of them.
///
/// When neither cutoff keeps a document, every positively scored document is kept. Rejected
/// documents (score zero) are only returned when nothing scored above zero.
pub(super) fn select(
	scores: &[f32],
	threshold: &Threshold,
	top_k: usize,
) -> (Vec<usize>, ThresholdStage) {
	let order = scoring::rank_desc(scores);
	let max_score = scores.iter().copied().fold(0.0_f32, f32::max);

	for (stage, ratio, floor) in [
		(ThresholdStage::Strict, threshold.strict_ratio, threshold.strict_floor),
		(ThresholdStage::Relaxed, threshold.relaxed_ratio, threshold.relaxed_floor),
	] {
		let cutoff = (ratio * max_score).max(floor);
		let kept = order
			.iter()
			.copied()
			.filter(|idx| scores[*idx] >= cutoff)
			.take(top_k)
			.collect::<Vec<_>>();

		if !kept.is_empty() {
			return (kept, stage);
		}
	}

	let kept = order
		.into_iter()
		.filter(|idx| max_score <= 0.0 || scores[*idx] > 0.0)
		.take(top_k)
		.collect();

	(kept, ThresholdStage::Unfiltered)
}

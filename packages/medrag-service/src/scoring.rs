use std::cmp::Ordering;

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

/// Indices of `scores`, best first. The sort is stable, so ties keep their input order.
pub fn rank_desc(scores: &[f32]) -> Vec<usize> {
	let mut order: Vec<usize> = (0..scores.len()).collect();

	order.sort_by(|left, right| cmp_f32_desc(scores[*left], scores[*right]));

	order
}

/// Min-max scales `values` into `[0, 1]` relative to this slice only.
///
/// A constant slice maps to `1.0` when its value is positive and to `0.0` otherwise.
pub fn min_max_normalize(values: &[f32]) -> Vec<f32> {
	let Some((min, max)) = min_max(values) else { return Vec::new() };
	let range = max - min;

	if range < f32::EPSILON {
		let fill = if max > 0.0 { 1.0 } else { 0.0 };

		return vec![fill; values.len()];
	}

	values.iter().map(|value| ((value - min) / range).clamp(0.0, 1.0)).collect()
}

fn min_max(values: &[f32]) -> Option<(f32, f32)> {
	if values.is_empty() {
		return None;
	}

	let mut min = f32::MAX;
	let mut max = f32::MIN;

	for &value in values {
		if value < min {
			min = value;
		}
		if value > max {
			max = value;
		}
	}

	Some((min, max))
}

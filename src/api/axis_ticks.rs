/// Approximate advance of one label glyph, as a fraction of the font size.
pub(super) const LABEL_GLYPH_WIDTH_RATIO: f64 = 0.6;

pub(super) fn axis_tick_target_count(
    axis_span_px: f64,
    target_spacing_px: f64,
    min_ticks: usize,
    max_ticks: usize,
) -> usize {
    if !axis_span_px.is_finite() || axis_span_px <= 0.0 {
        return min_ticks;
    }
    if !target_spacing_px.is_finite() || target_spacing_px <= 0.0 {
        return min_ticks;
    }

    let raw = (axis_span_px / target_spacing_px).floor() as usize + 1;
    raw.clamp(min_ticks, max_ticks.max(min_ticks))
}

pub(super) fn estimate_label_width(label: &str, font_size_px: f64) -> f64 {
    label.chars().count() as f64 * font_size_px * LABEL_GLYPH_WIDTH_RATIO
}

/// Keeps ticks at least `min_spacing_px` apart, preferring the last tick when
/// it can replace the previously kept one.
///
/// Items are `(payload, pixel_position)`; output is sorted by position.
pub(super) fn select_ticks_with_min_spacing<T: Clone>(
    mut ticks: Vec<(T, f64)>,
    min_spacing_px: f64,
) -> Vec<(T, f64)> {
    if ticks.is_empty() {
        return ticks;
    }

    ticks.sort_by(|left, right| left.1.total_cmp(&right.1));
    if ticks.len() == 1 || !min_spacing_px.is_finite() || min_spacing_px <= 0.0 {
        return ticks;
    }

    let mut selected: Vec<(T, f64)> = Vec::with_capacity(ticks.len());
    selected.push(ticks[0].clone());
    for tick in ticks.iter().skip(1) {
        let last_position = selected[selected.len() - 1].1;
        if tick.1 - last_position >= min_spacing_px {
            selected.push(tick.clone());
        }
    }

    let last_tick = ticks[ticks.len() - 1].clone();
    let selected_last = selected[selected.len() - 1].1;
    if selected_last != last_tick.1 {
        if selected.len() == 1 {
            // On very narrow axes a single label is clearer than overlapping pairs.
            selected[0] = last_tick;
        } else {
            let penultimate = selected[selected.len() - 2].1;
            if last_tick.1 - penultimate >= min_spacing_px {
                let last_index = selected.len() - 1;
                selected[last_index] = last_tick;
            }
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::{axis_tick_target_count, select_ticks_with_min_spacing};

    #[test]
    fn target_count_is_clamped() {
        assert_eq!(axis_tick_target_count(1000.0, 80.0, 2, 10), 10);
        assert_eq!(axis_tick_target_count(100.0, 80.0, 2, 10), 2);
        assert_eq!(axis_tick_target_count(f64::NAN, 80.0, 2, 10), 2);
    }

    #[test]
    fn crowded_ticks_are_thinned_and_keep_the_tail() {
        let selected = select_ticks_with_min_spacing(
            vec![("a", 0.0), ("b", 10.0), ("c", 30.0), ("d", 45.0), ("e", 70.0)],
            25.0,
        );
        let labels: Vec<&str> = selected.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, vec!["a", "c", "e"]);
    }
}

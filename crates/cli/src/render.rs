//! ASCII rendering of a packed group: one text row per lane, plus a time
//! axis. Events draw as `[===]` blocks with the label inlaid when it fits.

use timelane_core::model::{Event, EventsGroup};
use timelane_protocol::TimeScale;

/// The time window spanned by the group's events, padded so edge blocks
/// do not butt against the frame.
fn bounds(group: &EventsGroup) -> Option<(i64, i64)> {
    let mut min = i64::MAX;
    let mut max = i64::MIN;
    for lane in group.lanes() {
        for (era, _) in lane.entries() {
            min = min.min(era.min);
            max = max.max(era.max);
        }
    }
    (min <= max).then(|| (min, max.max(min + 1)))
}

fn paint(row: &mut [char], from: usize, to: usize, label: &str) {
    let to = to.min(row.len());
    if from >= to {
        return;
    }
    for cell in &mut row[from..to] {
        *cell = '=';
    }
    row[from] = '[';
    row[to - 1] = ']';
    // Inlay the label when the block has room for it.
    let interior = to - from;
    if interior >= label.len() + 2 {
        for (i, ch) in label.chars().enumerate() {
            row[from + 1 + i] = ch;
        }
    }
}

/// Render the group as one string per lane followed by an axis line.
pub fn render(group: &EventsGroup, width: usize) -> Vec<String> {
    let Some((t0, t1)) = bounds(group) else {
        return vec!["(no events)".to_owned()];
    };
    let scale = TimeScale::new(t0, t1, width as f64);

    let mut lines = Vec::new();
    for lane in group.lanes() {
        let mut row = vec![' '; width];
        for (era, ids) in lane.entries() {
            let from = scale.x_at(era.min).round().max(0.0) as usize;
            let to = (scale.x_at(era.max).round() as usize).max(from + 1);
            let label = ids
                .first()
                .and_then(|id| group.event(*id))
                .map_or("", Event::label);
            paint(&mut row, from, to, label);
        }
        lines.push(row.into_iter().collect());
    }

    let mut axis = vec!['-'; width];
    axis[0] = '|';
    axis[width - 1] = '|';
    let mut axis: String = axis.into_iter().collect();
    axis.push_str(&format!(" {t0}..{t1}"));
    lines.push(axis);
    lines
}

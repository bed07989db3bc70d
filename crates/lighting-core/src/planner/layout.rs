/// Picks the column/row split of `count` fixtures whose spacings along the
/// two axes are closest to each other.
///
/// Columns are tried from 1 up to `count`; rows follow as `ceil(count / columns)`.
/// Only splits with strictly positive spacing on both axes qualify, and the
/// first minimum wins. When the room leaves no positive extent inside the
/// margin (or `count` is zero) the result is `(1, 1)`.
pub fn best_grid(length: f64, width: f64, count: u32, margin: f64) -> (u32, u32) {
    let usable_length = length - 2.0 * margin;
    let usable_width = width - 2.0 * margin;

    if usable_length <= 0.0 || usable_width <= 0.0 || count == 0 {
        return degenerate_grid();
    }

    let mut best = degenerate_grid();
    let mut min_diff = f64::INFINITY;

    for columns in 1..=count {
        let rows = count.div_ceil(columns);
        let spacing_x = usable_length / columns as f64;
        let spacing_y = usable_width / rows as f64;
        let diff = (spacing_x - spacing_y).abs();

        if spacing_x > 0.0 && spacing_y > 0.0 && diff < min_diff {
            min_diff = diff;
            best = (columns, rows);
        }
    }

    best
}

/// Single-cell grid used when no subdivision has positive spacing.
fn degenerate_grid() -> (u32, u32) {
    (1, 1)
}

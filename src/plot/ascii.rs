//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - price pair: dependent leg `A`, hedged independent leg `B` (h * B)
//! - standardized spread: `*` line, `-` at zero, `.` at +/-1 and `:` at +/-2

use crate::domain::PairSpread;

/// Overlay the dependent leg and the hedged independent leg over the window.
///
/// The independent leg is scaled by the hedge ratio so both legs share one
/// axis; the vertical gap between them is the raw spread.
pub fn render_price_pair(
    spread: &PairSpread,
    dependent: &[f64],
    independent: &[f64],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let hedged: Vec<f64> = independent.iter().map(|b| spread.hedge_ratio * b).collect();

    let (y_min, y_max) = y_range(&[dependent, &hedged]).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_series(&mut grid, &hedged, y_min, y_max, 'B');
    draw_series(&mut grid, dependent, y_min, y_max, 'A');

    let mut out = header(spread);
    out.push_str(&format!(
        "Prices: A={} B={}*{:.4} | y=[{y_min:.2}, {y_max:.2}]\n",
        spread.pair.dependent, spread.pair.independent, spread.hedge_ratio
    ));
    push_grid(&mut out, grid);
    out
}

/// Plot the standardized spread with reference rows at 0, +/-1 and +/-2.
pub fn render_spread(spread: &PairSpread, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    // Always keep the +/-2 band visible.
    let (lo, hi) = y_range(&[&spread.zscore]).unwrap_or((-2.0, 2.0));
    let (y_min, y_max) = pad_range(lo.min(-2.0), hi.max(2.0), 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for (level, ch) in [(0.0, '-'), (1.0, '.'), (-1.0, '.'), (2.0, ':'), (-2.0, ':')] {
        let row = map_y(level, y_min, y_max, height);
        for cell in grid[row].iter_mut() {
            if *cell == ' ' {
                *cell = ch;
            }
        }
    }
    draw_series(&mut grid, &spread.zscore, y_min, y_max, '*');

    let mut out = header(spread);
    out.push_str(&format!("Spread z-score | y=[{y_min:.2}, {y_max:.2}]\n"));
    push_grid(&mut out, grid);
    out
}

fn header(spread: &PairSpread) -> String {
    match (spread.dates.first(), spread.dates.last()) {
        (Some(first), Some(last)) => format!("Plot: {} | dates=[{first}, {last}]\n", spread.pair),
        _ => format!("Plot: {}\n", spread.pair),
    }
}

fn push_grid(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
}

fn y_range(series: &[&[f64]]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for s in series {
        for &y in s.iter().filter(|y| y.is_finite()) {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    let width = width.max(2);
    if n < 2 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Draw a series across the full width; later series overwrite earlier ones.
fn draw_series(grid: &mut [Vec<char>], ys: &[f64], y_min: f64, y_max: f64, ch: char) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for (i, &y) in ys.iter().enumerate() {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let x = map_x(i, ys.len(), width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None => grid[yy][x] = ch,
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

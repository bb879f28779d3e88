//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - fitted curve: `-` line
//! - breakpoints: `|` column (only where nothing else is drawn)

use crate::domain::ObservationResidual;
use crate::models::Breakpoints;

/// Render observations, the fitted curve and breakpoint markers.
///
/// `curve` holds `(x, y_fit)` samples in ascending x; it is drawn segment by
/// segment so the line is not joined across a breakpoint jump.
pub fn render_ascii_plot(
    residuals: &[ObservationResidual],
    curve: &[(f64, f64)],
    breakpoints: &Breakpoints,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(residuals, curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(residuals, curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first, then breakpoints in the gaps, then points on top.
    let mut start = 0;
    while start < curve.len() {
        let segment = breakpoints.segment_of(curve[start].0);
        let len = curve[start..]
            .iter()
            .take_while(|(x, _)| breakpoints.segment_of(*x) == segment)
            .count();
        draw_curve(&mut grid, &curve[start..start + len], x_min, x_max, y_min, y_max);
        start += len;
    }

    for &b in breakpoints.as_slice() {
        if b < x_min || b > x_max {
            continue;
        }
        let col = map_x(b, x_min, x_max, width);
        for row in grid.iter_mut() {
            if row[col] == ' ' {
                row[col] = '|';
            }
        }
    }

    for r in residuals {
        let col = map_x(r.point.x, x_min, x_max, width);
        let row = map_y(r.point.y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.3}, {y_max:.3}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn x_range(residuals: &[ObservationResidual], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let xs = residuals.iter().map(|r| r.point.x).chain(curve.iter().map(|&(x, _)| x));
    finite_span(xs)
}

fn y_range(residuals: &[ObservationResidual], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let ys = residuals.iter().map(|r| r.point.y).chain(curve.iter().map(|&(_, y)| y));
    finite_span(ys)
}

fn finite_span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, '-'),
            None => grid[row][col] = '-',
        }
        prev = Some((col, row));
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
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
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

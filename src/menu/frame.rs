//! Frame drawing for the interactive menu: a fixed-width box of shaded
//! border characters with left-aligned, centered, and progress rows.

pub const FRAME_EDGE: char = '▒';
pub const FRAME_FILL: char = '░';
pub const FRAME_WIDTH: usize = 70;

pub const BANNER: &str = r#"
██████╗ ██╗██████╗ ██████╗ ███████╗██████╗
██╔══██╗██║██╔══██╗██╔══██╗██╔════╝██╔══██╗
██████╔╝██║██████╔╝██████╔╝█████╗  ██║  ██║
██╔══██╗██║██╔═══╝ ██╔═══╝ ██╔══╝  ██║  ██║
██║  ██║██║██║     ██║     ███████╗██████╔╝
╚═╝  ╚═╝╚═╝╚═╝     ╚═╝     ╚══════╝╚═════╝"#;

pub fn border() -> String {
    let mut line = String::new();
    line.push(FRAME_EDGE);
    line.extend(std::iter::repeat(FRAME_FILL).take(FRAME_WIDTH - 2));
    line.push(FRAME_EDGE);
    line
}

/// Left-aligned row; over-long content is clamped to the inner width.
pub fn row(text: &str) -> String {
    let inner = clamp(text, FRAME_WIDTH - 4);
    format!(
        "{FRAME_EDGE} {inner}{} {FRAME_EDGE}",
        " ".repeat(FRAME_WIDTH - 4 - inner.chars().count())
    )
}

pub fn row_center(text: &str) -> String {
    let inner = clamp(text, FRAME_WIDTH - 4);
    let padding = FRAME_WIDTH - 4 - inner.chars().count();
    let left = padding / 2;
    format!(
        "{FRAME_EDGE} {}{inner}{} {FRAME_EDGE}",
        " ".repeat(left),
        " ".repeat(padding - left)
    )
}

/// Progress row: label, bar of edge/fill chars, percentage. The ratio is
/// clamped to [0, 1].
pub fn progress_row(label: &str, ratio: f64) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    let bar_width = (FRAME_WIDTH.saturating_sub(label.chars().count() + 12)).max(10);
    let filled = (bar_width as f64 * ratio) as usize;
    let empty = bar_width - filled;

    let mut bar = String::new();
    bar.extend(std::iter::repeat(FRAME_EDGE).take(filled));
    bar.extend(std::iter::repeat(FRAME_FILL).take(empty));

    row(&format!("{label}: [{bar}] {:3}%", (ratio * 100.0) as usize))
}

fn clamp(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_have_frame_width() {
        assert_eq!(border().chars().count(), FRAME_WIDTH);
        assert_eq!(row("hello").chars().count(), FRAME_WIDTH);
        assert_eq!(row_center("hello").chars().count(), FRAME_WIDTH);
        assert_eq!(progress_row("Activity", 0.5).chars().count(), FRAME_WIDTH);
    }

    #[test]
    fn test_row_clamps_long_content() {
        let long = "x".repeat(FRAME_WIDTH * 2);
        assert_eq!(row(&long).chars().count(), FRAME_WIDTH);
    }

    #[test]
    fn test_progress_row_clamps_ratio() {
        let overfull = progress_row("Activity", 2.5);
        assert!(overfull.contains("100%"));
        let negative = progress_row("Activity", -1.0);
        assert!(negative.contains("  0%"));
    }

    #[test]
    fn test_banner_fits_frame() {
        for line in BANNER.lines() {
            assert!(line.chars().count() <= FRAME_WIDTH);
        }
    }
}

//! Terminal UI helpers for consistent recapctl output styling.

/// ANSI color codes using true color (24-bit)
pub mod colors {
    pub const HEADER: &str = "\x1b[38;2;255;210;120m";
    pub const OK: &str = "\x1b[38;2;120;255;120m";
    pub const ERR: &str = "\x1b[38;2;255;100;100m";
    pub const WARN: &str = "\x1b[38;2;255;200;100m";
    pub const DIM: &str = "\x1b[38;2;140;140;140m";
    pub const CYAN: &str = "\x1b[38;2;100;200;255m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

/// Unicode symbols
pub mod symbols {
    pub const OK: &str = "✓";
    pub const ERR: &str = "✗";
    pub const ARROW: &str = "›";
    pub const PROGRESS_FULL: &str = "█";
    pub const PROGRESS_EMPTY: &str = "░";
}

/// Horizontal rule
pub const HR: &str =
    "──────────────────────────────────────────────────────────────────────────────";

/// Print a styled header with version
pub fn print_header(name: &str, version: &str) {
    println!();
    println!("{}{} v{}{}", colors::HEADER, name, version, colors::RESET);
    println!("{}{}{}", colors::DIM, HR, colors::RESET);
}

/// Print a footer with horizontal rule
pub fn print_footer() {
    println!("{}{}{}", colors::DIM, HR, colors::RESET);
    println!();
}

/// Print a section header like [section] description
pub fn print_section(section: &str, description: &str) {
    println!(
        "{}[{}{}{}]{} {}",
        colors::DIM,
        colors::RESET,
        section,
        colors::DIM,
        colors::RESET,
        description
    );
}

/// Print an error line
pub fn print_err(message: &str) {
    eprintln!("{}{} {}{}", colors::ERR, symbols::ERR, message, colors::RESET);
}

/// Print a key/value line with fixed key width
pub fn print_kv(key: &str, value: &str, key_width: usize) {
    println!("{:width$} {}", key, value, width = key_width);
}

/// Print a key/value line with a colored value
pub fn print_kv_status(key: &str, value: &str, status_color: &str, key_width: usize) {
    println!(
        "{:width$} {}{}{}",
        key,
        status_color,
        value,
        colors::RESET,
        width = key_width
    );
}

/// Render a progress bar like ███████░░░ for 0.0..=1.0
pub fn progress_bar(progress: f32, width: usize) -> String {
    let clamped = progress.clamp(0.0, 1.0);
    let filled = (clamped * width as f32).round() as usize;
    let empty = width.saturating_sub(filled);
    format!(
        "{}{}",
        symbols::PROGRESS_FULL.repeat(filled),
        symbols::PROGRESS_EMPTY.repeat(empty)
    )
}

/// Color for a 0..=100 mastery-style score
pub fn score_color(score: u32) -> &'static str {
    if score >= 70 {
        colors::OK
    } else if score >= 50 {
        colors::WARN
    } else {
        colors::ERR
    }
}

/// Format an hour count as a compact duration like 4h, 3d, 2wk, 1mo
pub fn format_hours(hours: u32) -> String {
    match hours {
        0..=47 => format!("{}h", hours),
        48..=335 => format!("{}d", hours / 24),
        336..=1439 => format!("{}wk", hours / 168),
        _ => format!("{}mo", hours / 720),
    }
}

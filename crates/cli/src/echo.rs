use std::time::Duration;

use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "news-extract".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Extract clean article text and metadata from news pages\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print a timing line, coloured by how long the step took
pub fn print_timing(label: &str, duration: Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    let label = format!("{}:", label);

    match ms {
        ms if ms < 50.0 => eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "fast".dimmed()),
        ms if ms < 500.0 => eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "moderate".bright_yellow()),
        ms => eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "slow".bright_red()),
    }
}

/// Print extraction details summary
pub fn print_extraction_details(result: &news_extract_core::ExtractionResult) {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Extraction Details".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("  {} {}", "Title:".dimmed(), field(&result.title).bright_white());
    eprintln!("  {} {}", "Published:".dimmed(), field(&result.meta.published_at).bright_white());
    eprintln!("  {} {}", "Site:".dimmed(), field(&result.meta.site).bright_white());
    eprintln!("  {} {}", "Language:".dimmed(), field(&result.meta.lang).bright_white());
    eprintln!(
        "  {} {}\n",
        "Characters:".dimmed(),
        result.text.chars().count().to_string().bright_white()
    );
}

/// Print timing summary
pub fn print_timing_summary(total: Duration, timings: &[(String, Duration)]) {
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Timing Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());

    for (label, duration) in timings {
        print_timing(label, *duration);
    }

    eprintln!(
        "  {} {:>8.2}ms\n",
        format!("{}:", "Total").bold().dimmed(),
        total.as_secs_f64() * 1000.0
    );
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

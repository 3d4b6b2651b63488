use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::banner;
use crate::terminal::logging::PRINT_TARGET;

pub const TOTAL_WIDTH: usize = 64;
const KEY_WIDTH: usize = 12;

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, "{}", msg);
}

pub fn banner(no_banner: bool) {
    if no_banner {
        return;
    }

    banner::print();

    let text_content: String = format!("⟦ Current vulntechx version {} ⟧", version_tag());
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.bright_green().bold();
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2).bright_black();
    print(&format!("{}{}{}", sep, text, sep));
}

pub fn version() {
    println!("Current vulntechx version {}", version_tag());
}

fn version_tag() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

pub fn aligned_line(key: &str, value: &str) {
    let dots: String = ".".repeat((KEY_WIDTH + 1).saturating_sub(key.len()));
    let prefix: ColoredString = ">".bright_black();
    print(&format!(
        "{} {}{}{} {}",
        prefix,
        key.cyan(),
        dots.bright_black(),
        ":".bright_black(),
        value
    ));
}

pub fn centerln(msg: &str) {
    let space: String = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{}{}", space, msg));
}

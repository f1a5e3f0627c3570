pub mod code;
pub mod config;
pub mod history;
pub mod quiz;

/// `mm:ss` for a countdown in seconds.
pub fn format_remaining(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

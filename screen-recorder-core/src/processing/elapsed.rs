/// Format whole seconds as zero-padded `MM:SS`.
///
/// Minutes are not capped: 100 minutes formats as `100:00`.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

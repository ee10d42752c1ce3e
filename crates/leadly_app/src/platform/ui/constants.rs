pub const PROGRESS_BAR_WIDTH: usize = 20;
pub const PROGRESS_FILLED: &str = "#";
pub const PROGRESS_EMPTY: &str = "-";
pub const EXCERPT_CHARS: usize = 160;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

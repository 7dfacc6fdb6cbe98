const FILTER_COMPLEX_FLAG: &str = "-filter_complex";

/// Filters that combine several streams and only work inside a filter graph.
const GRAPH_ONLY_FILTERS: &[&str] = &["overlay=", "zoompan="];

pub const FILTER_COMPLEX_MESSAGE: &str =
    "Command should use -filter_complex for the specified filters.";

/// Flags multi-stream filters passed through `-vf`/`-af` instead of
/// `-filter_complex`. Returns the message to report, if any.
pub fn lint_filter_graph(command: &str) -> Option<&'static str> {
    let uses_graph_filter = GRAPH_ONLY_FILTERS
        .iter()
        .any(|filter| command.contains(filter));
    if uses_graph_filter && !command.contains(FILTER_COMPLEX_FLAG) {
        Some(FILTER_COMPLEX_MESSAGE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_without_filter_complex_is_reported() {
        let command = "ffmpeg -i a.mp4 -i logo.png -vf overlay=10:10 out.mp4";
        assert_eq!(lint_filter_graph(command), Some(FILTER_COMPLEX_MESSAGE));
    }

    #[test]
    fn overlay_inside_filter_complex_passes() {
        let command = "ffmpeg -i a.mp4 -i logo.png -filter_complex \"[0][1]overlay=10:10\" out.mp4";
        assert_eq!(lint_filter_graph(command), None);
    }

    #[test]
    fn plain_filters_pass() {
        assert_eq!(lint_filter_graph("ffmpeg -i a.mp4 -vf scale=640:-1 out.mp4"), None);
    }
}

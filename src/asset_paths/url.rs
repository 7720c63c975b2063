/// Join a public base URL and a relative path with exactly one `/` between them.
///
/// An empty base yields a root-relative path so published assets stay addressable when the
/// asset directory is served from the web root.
pub fn join_url(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches('/');
    let relative = relative.trim_start_matches('/').replace('\\', "/");
    if relative.is_empty() {
        return base.to_string();
    }
    format!("{base}/{relative}")
}

#[cfg(test)]
mod tests {
    use super::join_url;

    #[test]
    fn joins_with_single_separator() {
        assert_eq!(join_url("/assets", "1a2b"), "/assets/1a2b");
        assert_eq!(join_url("/assets/", "/1a2b"), "/assets/1a2b");
        assert_eq!(join_url("//cdn.example.com/", "lib"), "//cdn.example.com/lib");
    }

    #[test]
    fn empty_base_produces_root_relative_url() {
        assert_eq!(join_url("", "1a2b"), "/1a2b");
    }

    #[test]
    fn normalises_backslashes_from_windows_inputs() {
        assert_eq!(join_url("/assets", "abc\\require.js"), "/assets/abc/require.js");
    }

    #[test]
    fn empty_relative_returns_trimmed_base() {
        assert_eq!(join_url("/assets/", ""), "/assets");
    }
}

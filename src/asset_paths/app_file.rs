/// Canonicalise the bootstrap filename into the `/name.js` form used for `data-main`.
///
/// The `.js` suffix check is case-sensitive, so `App.JS` becomes `/App.JS.js`. Applying the
/// function to its own output returns the same string.
pub fn normalize_app_file(raw: &str) -> String {
    let mut main = String::with_capacity(raw.len() + 4);
    if !raw.starts_with('/') {
        main.push('/');
    }
    main.push_str(raw);
    if !raw.ends_with(".js") {
        main.push_str(".js");
    }
    main
}

#[cfg(test)]
mod tests {
    use super::normalize_app_file;

    #[test]
    fn adds_missing_prefix_and_suffix() {
        assert_eq!(normalize_app_file("MyApp"), "/MyApp.js");
        assert_eq!(normalize_app_file("/MyApp"), "/MyApp.js");
        assert_eq!(normalize_app_file("MyApp.js"), "/MyApp.js");
        assert_eq!(normalize_app_file("/MyApp.js"), "/MyApp.js");
    }

    #[test]
    fn suffix_check_is_case_sensitive() {
        assert_eq!(normalize_app_file("a.js"), "/a.js");
        assert_eq!(normalize_app_file("a"), "/a.js");
        assert_eq!(normalize_app_file("a.JS"), "/a.JS.js");
    }

    #[test]
    fn keeps_nested_paths() {
        assert_eq!(normalize_app_file("apps/main"), "/apps/main.js");
    }

    #[test]
    fn normalisation_is_idempotent() {
        for raw in ["MyApp", "/MyApp", "MyApp.js", "/MyApp.js", "a.JS", "x/y", ".js", "/"] {
            let once = normalize_app_file(raw);
            assert_eq!(normalize_app_file(&once), once, "input {raw:?}");
        }
    }
}

/// Split `raw` into `(base_and_query, format_override)` on the rightmost
/// `~` found after the final `://`, per spec.md §4.1:
///
/// > The `~` separator is scanned after the final `://` so that URL query
/// > strings embedded in `base` are preserved intact.
///
/// If there is no `://`, the scan covers the whole string.
pub fn split_format_override(raw: &str) -> (&str, Option<&str>) {
    let scan_from = raw.rfind("://").map(|i| i + 3).unwrap_or(0);
    match raw[scan_from..].rfind('~') {
        Some(rel) => {
            let at = scan_from + rel;
            (&raw[..at], Some(&raw[at + 1..]))
        }
        None => (raw, None),
    }
}

/// Split `base_and_query` (the text before `~`, if any) into `(base, query)`
/// per spec.md §4.1:
///
/// - If a `~` was present (`has_format_override`), `base_and_query` is left
///   untouched: any `?` in it belongs to the base itself (e.g. a URL's native
///   query, preserved intact by `split_format_override` scanning after the
///   final `://`). The JN query in this case lives in the `~`-suffix and is
///   the caller's job to split from there, not this function's.
/// - Else if `base_and_query` contains `://`, it's a bare URL: its native
///   query string belongs to the URL, so there is no JN query and no split
///   occurs.
/// - Else (a bare path/address with no `~` and no scheme), a `?` starts the
///   JN query.
pub fn split_query<'a>(base_and_query: &'a str, has_format_override: bool) -> (&'a str, Option<&'a str>) {
    if has_format_override || base_and_query.contains("://") {
        (base_and_query, None)
    } else {
        match base_and_query.find('?') {
            Some(at) => (&base_and_query[..at], Some(&base_and_query[at + 1..])),
            None => (base_and_query, None),
        }
    }
}

/// Compression suffixes recognized by spec.md §4.1, longest first so `.tar.gz`-style
/// ambiguity never arises (only single-extension suffixes are in scope).
const COMPRESSION_SUFFIXES: [(&str, &str); 3] = [(".gz", "gz"), (".bz2", "bz2"), (".xz", "xz")];

/// Strip a trailing compression suffix from `base`, returning `(stripped_base, suffix)`.
/// Caller is responsible for only invoking this when `kind` is eligible
/// (`file`, `protocol`, `glob` per spec.md §4.1).
pub fn strip_compression(base: &str) -> (&str, Option<&'static str>) {
    for (suffix, name) in COMPRESSION_SUFFIXES {
        if let Some(stripped) = base.strip_suffix(suffix) {
            return (stripped, Some(name));
        }
    }
    (base, None)
}

/// Split a format shorthand like `table.grid` into `(format, Some(modifier))`,
/// or `(format, None)` if there's no `.`. The modifier key used in parameters
/// is format-specific; spec.md's example pairs `table` with `tablefmt`.
pub fn split_format_shorthand(format_override: &str) -> (&str, Option<(&'static str, &str)>) {
    match format_override.split_once('.') {
        Some((head, tail)) => {
            let key = shorthand_key_for(head);
            (head, Some((key, tail)))
        }
        None => (format_override, None),
    }
}

fn shorthand_key_for(format: &str) -> &'static str {
    match format {
        "table" => "tablefmt",
        _ => "variant",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_format_override_after_final_scheme() {
        let (base_q, fmt) = split_format_override("https://ex.com/data.csv?token=abc~csv?delimiter=;");
        assert_eq!(base_q, "https://ex.com/data.csv?token=abc");
        assert_eq!(fmt, Some("csv?delimiter=;"));
    }

    #[test]
    fn no_tilde_leaves_base_whole() {
        let (base_q, fmt) = split_format_override("https://ex.com/data.csv?token=abc");
        assert_eq!(base_q, "https://ex.com/data.csv?token=abc");
        assert_eq!(fmt, None);
    }

    #[test]
    fn format_override_leaves_base_intact() {
        let (base, query) = split_query("data.csv?token=abc", true);
        assert_eq!(base, "data.csv?token=abc");
        assert_eq!(query, None);
    }

    #[test]
    fn format_override_on_a_url_leaves_native_query_attached() {
        let (base, query) = split_query("https://ex.com/data.csv.gz?token=abc", true);
        assert_eq!(base, "https://ex.com/data.csv.gz?token=abc");
        assert_eq!(query, None);
    }

    #[test]
    fn url_query_with_no_override_stays_with_base() {
        let (base, query) = split_query("https://ex.com/data.csv?token=abc", false);
        assert_eq!(base, "https://ex.com/data.csv?token=abc");
        assert_eq!(query, None);
    }

    #[test]
    fn bare_address_question_mark_starts_query() {
        let (base, query) = split_query("orders.csv?header=false", false);
        assert_eq!(base, "orders.csv");
        assert_eq!(query, Some("header=false"));
    }

    #[test]
    fn strips_known_compression_suffixes() {
        assert_eq!(strip_compression("data.csv.gz"), ("data.csv", Some("gz")));
        assert_eq!(strip_compression("data.csv.bz2"), ("data.csv", Some("bz2")));
        assert_eq!(strip_compression("data.csv.xz"), ("data.csv", Some("xz")));
        assert_eq!(strip_compression("data.csv"), ("data.csv", None));
    }

    #[test]
    fn splits_table_grid_shorthand() {
        let (fmt, extra) = split_format_shorthand("table.grid");
        assert_eq!(fmt, "table");
        assert_eq!(extra, Some(("tablefmt", "grid")));
    }

    #[test]
    fn no_dot_shorthand_passes_through() {
        let (fmt, extra) = split_format_shorthand("csv");
        assert_eq!(fmt, "csv");
        assert_eq!(extra, None);
    }
}

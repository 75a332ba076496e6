use crate::grammar::{split_format_override, split_format_shorthand, split_query, strip_compression};
use crate::kind::{classify, Kind};

/// Ordered list of `(key, value)` pairs, duplicates preserved in the order
/// encountered (spec.md §3: "duplicate keys allowed; order preserved" for
/// the raw parameter list itself — this is distinct from `Config`, which
/// collapses duplicates on later-overrides-earlier).
pub type Parameters = Vec<(String, String)>;

/// Result of parsing a single address descriptor (spec.md §3, §4.1).
#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub raw: String,
    pub kind: Kind,
    pub base: String,
    pub format_override: Option<String>,
    pub parameters: Parameters,
    pub compression: Option<String>,
}

/// Kinds eligible for compression-suffix stripping (spec.md §4.1).
fn compression_eligible(kind: Kind) -> bool {
    matches!(kind, Kind::File | Kind::Protocol | Kind::Glob)
}

/// Parse `raw` into an [`Address`]. Pure, deterministic, infallible:
/// ill-formed input degrades to `kind = file` or `kind = bare-address`
/// with empty parameters rather than erroring (spec.md §4.1).
pub fn parse(raw: &str) -> Address {
    let (base_and_query, format_override_raw) = split_format_override(raw);
    let (base_before_compression, query_raw) = split_query(base_and_query, format_override_raw.is_some());

    let kind = classify(base_before_compression);

    let (base, compression) = if compression_eligible(kind) {
        // `base_before_compression` may still carry a URL's native query
        // (split_query leaves it attached whenever a `~` or `://` is
        // present), so the compression suffix has to be located just before
        // that query rather than at the literal end of the string.
        let query_at = base_before_compression.find('?').unwrap_or(base_before_compression.len());
        let (path, native_query) = base_before_compression.split_at(query_at);
        let (stripped_path, suffix) = strip_compression(path);
        let mut rebuilt = stripped_path.to_string();
        rebuilt.push_str(native_query);
        (rebuilt, suffix.map(str::to_string))
    } else {
        (base_before_compression.to_string(), None)
    };

    // The `~`-suffix carries its own `format?query` grammar (spec.md §4.1):
    // the format token up to the first `?`, then the JN query for that
    // format, decoded the same way as a bare address's query.
    let (format_override, format_parameters) = match format_override_raw {
        Some(raw_fmt) => {
            let (fmt_only, fmt_query) = match raw_fmt.find('?') {
                Some(at) => (&raw_fmt[..at], Some(&raw_fmt[at + 1..])),
                None => (raw_fmt, None),
            };
            let (fmt, shorthand) = split_format_shorthand(fmt_only);
            let mut params = fmt_query.map(decode_parameters).unwrap_or_default();
            if let Some((key, value)) = shorthand {
                params.push((key.to_string(), value.to_string()));
            }
            (Some(fmt.to_string()), params)
        }
        None => (None, Vec::new()),
    };

    let mut parameters = query_raw.map(decode_parameters).unwrap_or_default();
    parameters.extend(format_parameters);

    Address {
        raw: raw.to_string(),
        kind,
        base,
        format_override,
        parameters,
        compression,
    }
}

/// Decode a query string as `application/x-www-form-urlencoded` (spec.md
/// §4.1). Operator suffixes on keys (`=`, `!=`, `>`, `<`, `>=`, `<=`) are
/// carried verbatim; this layer does not interpret them.
fn decode_parameters(query: &str) -> Parameters {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Rebuild the textual form of an address from its parts. Used to verify
/// the parser-fidelity invariant (`raw == reconstruct(...)` up to
/// insignificant whitespace, spec.md §3, §8 property 1).
pub fn reconstruct(address: &Address) -> String {
    let mut base = address.base.clone();
    if let Some(suffix) = &address.compression {
        base.push('.');
        base.push_str(suffix);
    }

    let mut out = base;
    if let Some(fmt) = &address.format_override {
        out.push('~');
        out.push_str(fmt);
    }
    if !address.parameters.is_empty() {
        out.push('?');
        out.push_str(&encode_parameters(&address.parameters));
    }
    out
}

fn encode_parameters(parameters: &[(String, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in parameters {
        serializer.append_pair(k, v);
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_example_address_round_trip() {
        let a = parse("https://ex.com/data.csv.gz?token=abc~csv?delimiter=;");
        assert_eq!(a.base, "https://ex.com/data.csv?token=abc");
        assert_eq!(a.compression, Some("gz".to_string()));
        assert_eq!(a.format_override, Some("csv".to_string()));
        assert_eq!(a.parameters, vec![("delimiter".to_string(), ";".to_string())]);
    }

    #[test]
    fn plain_file_has_no_parameters() {
        let a = parse("orders.csv");
        assert_eq!(a.kind, Kind::File);
        assert_eq!(a.base, "orders.csv");
        assert!(a.parameters.is_empty());
    }

    #[test]
    fn url_without_override_keeps_native_query() {
        let a = parse("https://ex.com/report?year=2024");
        assert_eq!(a.base, "https://ex.com/report?year=2024");
        assert!(a.parameters.is_empty());
    }

    #[test]
    fn bare_query_becomes_parameters() {
        let a = parse("orders.csv?header=false&delimiter=;");
        assert_eq!(a.base, "orders.csv");
        assert_eq!(
            a.parameters,
            vec![
                ("header".to_string(), "false".to_string()),
                ("delimiter".to_string(), ";".to_string()),
            ]
        );
    }

    #[test]
    fn duplicate_keys_preserved_in_order() {
        let a = parse("orders.csv?tag=a&tag=b");
        assert_eq!(
            a.parameters,
            vec![("tag".to_string(), "a".to_string()), ("tag".to_string(), "b".to_string())]
        );
    }

    #[test]
    fn stdio_dash() {
        let a = parse("-");
        assert_eq!(a.kind, Kind::Stdio);
        assert_eq!(a.base, "-");
    }

    #[test]
    fn profile_component_address() {
        let a = parse("@postgres/orders?limit=10");
        assert_eq!(a.kind, Kind::Profile);
        assert_eq!(a.base, "@postgres/orders");
        assert_eq!(a.parameters, vec![("limit".to_string(), "10".to_string())]);
    }

    #[test]
    fn table_grid_shorthand_becomes_parameter() {
        let a = parse("report.txt~table.grid");
        assert_eq!(a.format_override, Some("table".to_string()));
        assert_eq!(a.parameters, vec![("tablefmt".to_string(), "grid".to_string())]);
    }

    #[test]
    fn reconstruct_round_trips_simple_address() {
        let raw = "orders.csv.gz~csv?delimiter=%3B";
        let a = parse(raw);
        assert_eq!(reconstruct(&a), raw);
    }
}

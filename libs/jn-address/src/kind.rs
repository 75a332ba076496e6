use regex::Regex;
use std::sync::LazyLock;

/// The seven address kinds (spec.md §3, §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    File,
    Protocol,
    Profile,
    Plugin,
    Stdio,
    Glob,
    BareAddress,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Kind::File => "file",
            Kind::Protocol => "protocol",
            Kind::Profile => "profile",
            Kind::Plugin => "plugin",
            Kind::Stdio => "stdio",
            Kind::Glob => "glob",
            Kind::BareAddress => "bare-address",
        };
        write!(f, "{s}")
    }
}

static PROFILE_COMPONENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[A-Za-z0-9_.-]+/").unwrap());
static PROFILE_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[A-Za-z0-9_.-]+$").unwrap());
static PROTOCOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9+.-]*://").unwrap());

/// Glob meta-characters per spec.md §4.1: `*`, `**` (covered by `*`), `[`, `]`.
const GLOB_META: [char; 3] = ['*', '[', ']'];

/// Classify `base` per spec.md §4.1. Order matters: stdio, then glob
/// (checked outside any protocol prefix), then profile/plugin, then
/// protocol, then the file fallback.
pub fn classify(base: &str) -> Kind {
    // Ill-formed degrade case (spec.md §4.1): an empty base matches none of
    // the positive classification rules and has no sensible file reading,
    // so it falls back to the catch-all kind rather than `file`.
    if base.is_empty() {
        return Kind::BareAddress;
    }
    if base == "-" {
        return Kind::Stdio;
    }

    if contains_glob_meta_outside_scheme(base) {
        return Kind::Glob;
    }

    if PROFILE_COMPONENT_RE.is_match(base) || PROFILE_BARE_RE.is_match(base) {
        return classify_profile_or_plugin(base);
    }

    if PROTOCOL_RE.is_match(base) {
        return Kind::Protocol;
    }

    Kind::File
}

fn classify_profile_or_plugin(base: &str) -> Kind {
    if PROFILE_COMPONENT_RE.is_match(base) {
        Kind::Profile
    } else {
        Kind::Plugin
    }
}

/// A glob meta-character "outside a protocol prefix" means outside the
/// `scheme://` part itself — metacharacters in the path/query after a
/// scheme still mark the whole address as a glob (e.g. `s3://bucket/*.csv`).
fn contains_glob_meta_outside_scheme(base: &str) -> bool {
    let after_scheme = base.find("://").map(|i| i + 3).unwrap_or(0);
    base[after_scheme..].chars().any(|c| GLOB_META.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_base_is_bare_address() {
        assert_eq!(classify(""), Kind::BareAddress);
    }

    #[test]
    fn stdio_is_dash() {
        assert_eq!(classify("-"), Kind::Stdio);
    }

    #[test]
    fn glob_detected() {
        assert_eq!(classify("data/*.csv"), Kind::Glob);
        assert_eq!(classify("logs/[0-9].txt"), Kind::Glob);
    }

    #[test]
    fn profile_component() {
        assert_eq!(classify("@postgres/orders"), Kind::Profile);
    }

    #[test]
    fn plugin_bare() {
        assert_eq!(classify("@csv"), Kind::Plugin);
    }

    #[test]
    fn protocol_scheme() {
        assert_eq!(classify("https://example.com/data.csv"), Kind::Protocol);
        assert_eq!(classify("s3://bucket/key"), Kind::Protocol);
    }

    #[test]
    fn plain_path_is_file() {
        assert_eq!(classify("./data/orders.csv"), Kind::File);
        assert_eq!(classify("orders.csv"), Kind::File);
    }
}

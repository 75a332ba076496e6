/// Expand `${NAME}` placeholders in `s` using the calling process's
/// environment (spec.md §4.3, §6.6). Unset variables expand to an empty
/// string; `$NAME` without braces and `${` without a closing `}` are left
/// untouched (only the well-formed `${...}` form is a placeholder).
pub fn expand_placeholders(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar..];
        if after.as_bytes().get(1) == Some(&b'{') {
            if let Some(close) = after[2..].find('}') {
                let name = &after[2..2 + close];
                let value = std::env::var(name).unwrap_or_default();
                out.push_str(&value);
                rest = &after[2 + close + 1..];
                continue;
            }
        }
        out.push('$');
        rest = &after[1..];
    }
    out.push_str(rest);
    out
}

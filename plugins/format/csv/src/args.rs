/// The plugin's own recognized options (DESIGN.md's typed `Config` per
/// plugin: CSV gets `{delimiter, header, no_header, max_fields_per_row}`).
/// Anything else on the command line is an address parameter the plugin
/// doesn't understand (e.g. leftover profile defaults); rather than
/// failing on an unrecognized flag, it's consumed and ignored, since the
/// orchestrator always passes `--<key> <value>` pairs uniformly for every
/// merged config entry regardless of which plugin receives them.
#[derive(Debug, Clone)]
pub struct Args {
    pub mode: String,
    pub delimiter: Option<String>,
    pub header: Option<bool>,
    pub no_header: bool,
    pub max_fields_per_row: usize,
    pub strict_nested: bool,
    pub target: Option<String>,
}

const DEFAULT_MAX_FIELDS: usize = 4096;

pub fn parse(argv: impl Iterator<Item = String>) -> Args {
    let mut mode = String::new();
    let mut delimiter = None;
    let mut header = None;
    let mut no_header = false;
    let mut max_fields_per_row = DEFAULT_MAX_FIELDS;
    let mut strict_nested = false;
    let mut target = None;

    let mut args = argv.peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mode" => mode = args.next().unwrap_or_default(),
            "--delimiter" => delimiter = args.next(),
            "--header" => header = args.next().map(|v| parse_bool(&v)),
            "--no-header" | "--no_header" => {
                no_header = args.next().map(|v| parse_bool(&v)).unwrap_or(true)
            }
            "--max-fields-per-row" | "--max_fields_per_row" => {
                if let Some(v) = args.next() {
                    if let Ok(n) = v.parse::<usize>() {
                        max_fields_per_row = n.max(4096);
                    }
                }
            }
            "--strict-nested" | "--strict_nested" => {
                strict_nested = args.next().map(|v| parse_bool(&v)).unwrap_or(true)
            }
            flag if flag.starts_with("--") => {
                // Unrecognized config flag: still consume its value so the
                // positional target isn't mistaken for one.
                args.next();
            }
            positional => target = Some(positional.to_string()),
        }
    }

    Args {
        mode,
        delimiter,
        header,
        no_header,
        max_fields_per_row,
        strict_nested,
        target,
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(s, "true" | "1" | "yes")
}

impl Args {
    /// Header is on by default (spec.md §4.5.1 "Default: treat first row
    /// as header"); `--no-header` or an explicit `--header false` turn it
    /// off.
    pub fn header_enabled(&self) -> bool {
        if self.no_header {
            return false;
        }
        self.header.unwrap_or(true)
    }
}

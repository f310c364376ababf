use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        let format = parse_format(env::var("READER_OUTPUT_FORMAT").ok().as_deref());
        let pretty = parse_flag(env::var("READER_OUTPUT_PRETTY").ok().as_deref());
        OutputConfig { format, pretty }
    }

    /// `--json` on the command line wins over the environment.
    pub fn json() -> Self {
        OutputConfig { format: OutputFormat::Json, ..Self::from_env() }
    }
}

fn parse_format(v: Option<&str>) -> OutputFormat {
    match v {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Text,
    }
}

fn parse_flag(v: Option<&str>) -> bool {
    match v {
        Some(v) => v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"),
        None => false,
    }
}

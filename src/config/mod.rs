//! Startup configuration. Everything here is read once, before the router is
//! built; request handling only ever sees immutable copies.

pub mod gate;
pub mod service;

pub use gate::GateConfig;
pub use service::ServiceConfig;

use std::str::FromStr;

/// Parse an optional raw value, falling back to `default` when unset or blank.
pub(crate) fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(s) => s
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{name}={s:?} is not valid: {e}")),
    }
}

/// `1/true/yes/on` → true, `0/false/no/off` → false, unset → `default`.
pub(crate) fn parse_flag(name: &str, raw: Option<String>, default: bool) -> anyhow::Result<bool> {
    match raw.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(s) => match s.as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("{name}={other:?} is not a boolean flag"),
        },
    }
}

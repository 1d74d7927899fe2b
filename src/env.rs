//! Environment variables as a name to value map.

use std::collections::BTreeMap;

/// Map of environment variable names to values.
pub type EnvMap = BTreeMap<String, String>;

/// Split each `NAME=value` entry on its first `=`.
///
/// An entry without `=` maps to an empty value. Later duplicates replace earlier ones.
pub fn parse_env<I, S>(entries: I) -> EnvMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|entry| {
            let entry = entry.as_ref();
            let (name, value) = entry.split_once('=').unwrap_or((entry, ""));
            (name.to_string(), value.to_string())
        })
        .collect()
}

/// The environment of the running process. Variables that are not valid unicode are skipped.
pub fn environ() -> EnvMap {
    std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

//! Error taxonomy shared by tokenizing, scanning, value coercion and help rendering.

use thiserror::Error;

/// Errors raised while turning raw arguments into executed option handlers.
///
/// Keys are stored undecorated; the messages decorate them with dashes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed argument: \"{}\"", .raw)]
    MalformedArgument { raw: String },

    #[error("unrecognized option: {}", decorated(.key))]
    UnrecognizedOption { key: String },

    #[error("option \"{}\" requires a value, but none was given", decorated(.key))]
    MissingRequiredValue { key: String },

    #[error("option \"{}\" takes no value but was given \"{}\"", decorated(.key), .value)]
    UnexpectedValue { key: String, value: String },

    #[error("invalid value \"{}\" given to option \"{}\"", .value, decorated(.key))]
    InvalidValue {
        key: String,
        value: String,
        target_type: &'static str,
    },

    #[error("Your display is impossibly small, therefore we could not print the help message...")]
    DisplayTooNarrow,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Decorate an option key with dashes: one for single-character keys, two otherwise.
pub fn decorated(key: &str) -> String {
    let dashes = if key.chars().count() == 1 { "-" } else { "--" };
    format!("{}{}", dashes, key)
}

//! optable - declarative option tables with deferred dispatch.
//!
//! This library tokenizes command-line arguments (or `key value` streams),
//! matches them against an ordered table of declared options, and runs typed
//! handlers only after an optional pre-run inspection step has had a chance
//! to cancel execution. It also renders the table as two-column help text.

pub mod config;
pub mod env;
pub mod error;
pub mod help;
pub mod option;
pub mod parser;
pub mod scan;

pub use config::{Collector, ConfigError, OptionConfig, TableConfig};
pub use env::{environ, parse_env, EnvMap};
pub use error::{decorated, Error, Result};
pub use help::{generate_help, render_help, word_wrap, Layout, TerminalSize};
pub use option::{
    for_type, heading, hidden, opt_value, text, value, Handler, Opt, Role, Table, ValuePolicy,
    Visibility,
};
pub use parser::{
    parse_args, parse_args_os, parse_file, parse_process_args, parse_reader, ArgPair, ArgStore, Origin,
};
pub use scan::{count, group_by_key, run, scan, scan_and_run, scan_run, Job, Jobs, Outcome, Thunk};

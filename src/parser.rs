//! Tokenizing of raw arguments and `key value` streams into ordered key/value pairs.

use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Where an [`ArgStore`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A process argument vector; the first pair is the program name.
    Process,
    /// Lines of a text stream or file.
    Stream,
}

/// A single tokenized argument.
///
/// An empty key marks a positional value; an empty value means no value was attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgPair {
    pub key: String,
    pub value: String,
}

impl ArgPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether this pair is a positional value rather than an option.
    pub fn is_positional(&self) -> bool {
        self.key.is_empty()
    }

    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Ordered sequence of tokenized arguments, duplicates preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgStore {
    origin: Origin,
    pairs: Vec<ArgPair>,
}

impl ArgStore {
    pub fn new(origin: Origin, pairs: Vec<ArgPair>) -> Self {
        Self { origin, pairs }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// All pairs, including the program name for process arguments.
    pub fn pairs(&self) -> &[ArgPair] {
        &self.pairs
    }

    /// The pairs a scan should look at: process arguments skip the program name.
    pub fn scannable(&self) -> &[ArgPair] {
        match self.origin {
            Origin::Process => self.pairs.get(1..).unwrap_or(&[]),
            Origin::Stream => &self.pairs,
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArgPair> {
        self.pairs.iter()
    }
}

impl<'a> IntoIterator for &'a ArgStore {
    type Item = &'a ArgPair;
    type IntoIter = std::slice::Iter<'a, ArgPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// Tokenize a process-style argument vector. The first element is expected to be
/// the program name; it is tokenized like any other argument and skipped at scan time.
pub fn parse_args<I, S>(args: I) -> Result<ArgStore>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut pairs = Vec::new();
    for arg in args {
        tokenize(arg.as_ref(), &mut pairs)?;
    }
    tracing::debug!(pairs = pairs.len(), "tokenized process arguments");
    Ok(ArgStore::new(Origin::Process, pairs))
}

/// Tokenize an argument vector that may not be valid UTF-8.
///
/// An argument that is not valid UTF-8 is a [`Error::MalformedArgument`], reported lossily.
pub fn parse_args_os<I, S>(args: I) -> Result<ArgStore>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let raws = args
        .iter()
        .map(|arg| {
            let arg = arg.as_ref();
            arg.to_str().ok_or_else(|| Error::MalformedArgument {
                raw: arg.to_string_lossy().into_owned(),
            })
        })
        .collect::<Result<Vec<&str>>>()?;
    parse_args(raws)
}

/// Tokenize the arguments of the running process.
pub fn parse_process_args() -> Result<ArgStore> {
    parse_args_os(std::env::args_os())
}

/// Tokenize a stream of `key value` lines.
///
/// Each line is split on its first run of whitespace; leading whitespace is dropped
/// from both halves. Blank lines are skipped.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<ArgStore> {
    let mut pairs = Vec::new();
    for line in reader.lines() {
        if let Some(pair) = parse_line(&line?) {
            pairs.push(pair);
        }
    }
    tracing::debug!(pairs = pairs.len(), "tokenized stream");
    Ok(ArgStore::new(Origin::Stream, pairs))
}

/// Open a file and tokenize it like [`parse_reader`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<ArgStore> {
    let file = File::open(path.as_ref())?;
    parse_reader(BufReader::new(file))
}

fn parse_line(line: &str) -> Option<ArgPair> {
    let line = line.trim_start();
    if line.is_empty() {
        return None;
    }
    let (key, rest) = match line.find(char::is_whitespace) {
        Some(idx) => line.split_at(idx),
        None => (line, ""),
    };
    Some(ArgPair::new(key, rest.trim_start()))
}

fn tokenize(raw: &str, pairs: &mut Vec<ArgPair>) -> Result<()> {
    let malformed = || Error::MalformedArgument {
        raw: raw.to_string(),
    };

    let Some(body) = raw.strip_prefix('-') else {
        // Positional value, including the empty string
        pairs.push(ArgPair::new("", raw));
        return Ok(());
    };

    if let Some(long) = body.strip_prefix('-') {
        let (key, value) = long.split_once('=').unwrap_or((long, ""));
        if key.is_empty() || key.starts_with('-') {
            return Err(malformed());
        }
        pairs.push(ArgPair::new(key, value));
        return Ok(());
    }

    if body.starts_with('=') {
        return Err(malformed());
    }

    // Short cluster: every character is its own key until one is followed by '='
    let mut chars = body.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        let key = &body[idx..idx + c.len_utf8()];
        if let Some(&(eq, '=')) = chars.peek() {
            pairs.push(ArgPair::new(key, &body[eq + 1..]));
            break;
        }
        pairs.push(ArgPair::new(key, ""));
    }

    Ok(())
}

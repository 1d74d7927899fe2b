//! Option declarations: keys, value policy, visibility, role and typed handlers.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::str::FromStr;

/// Whether an option takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValuePolicy {
    /// A value is an error.
    #[default]
    Absent,
    /// A value may be given or omitted.
    Optional,
    /// Omitting the value is an error.
    Required,
}

/// Whether an option shows up in the help table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Listed,
    Hidden,
}

/// What an entry in a table is for. Only `Normal` entries are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Normal,
    /// A line of free text in the help table.
    Text,
    /// A section header in the help table.
    Heading,
}

/// Receives the raw value of a matched argument.
///
/// `key` is the long key of the option being set and is only used for error messages.
pub trait Handler {
    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn policy(&self) -> ValuePolicy;
}

/// A handler that coerces the raw value to `T` before passing it to a callback.
///
/// The callback gets `None` when the argument carried no value.
pub struct ForType<T, F> {
    policy: ValuePolicy,
    callback: F,
    _target: PhantomData<fn() -> T>,
}

impl<T, F> Handler for ForType<T, F>
where
    T: FromStr,
    F: Fn(Option<T>),
{
    fn set(&self, key: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            if self.policy == ValuePolicy::Required {
                return Err(Error::MissingRequiredValue {
                    key: key.to_string(),
                });
            }
            (self.callback)(None);
            return Ok(());
        }

        if self.policy == ValuePolicy::Absent {
            return Err(Error::UnexpectedValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        let parsed = value.parse::<T>().map_err(|_| Error::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            target_type: std::any::type_name::<T>(),
        })?;
        (self.callback)(Some(parsed));
        Ok(())
    }

    fn policy(&self) -> ValuePolicy {
        self.policy
    }
}

/// Build a typed handler for values of type `T`.
pub fn for_type<T, F>(policy: ValuePolicy, callback: F) -> ForType<T, F>
where
    T: FromStr,
    F: Fn(Option<T>),
{
    ForType {
        policy,
        callback,
        _target: PhantomData,
    }
}

/// Handler that requires a value and stores it into `target`.
pub fn value<T>(target: &Rc<RefCell<T>>) -> impl Handler
where
    T: FromStr + 'static,
{
    let target = Rc::clone(target);
    for_type(ValuePolicy::Required, move |v: Option<T>| {
        if let Some(v) = v {
            *target.borrow_mut() = v;
        }
    })
}

/// Handler that accepts an optional value and stores it into `target` when given.
pub fn opt_value<T>(target: &Rc<RefCell<Option<T>>>) -> impl Handler
where
    T: FromStr + 'static,
{
    let target = Rc::clone(target);
    for_type(ValuePolicy::Optional, move |v: Option<T>| {
        if v.is_some() {
            *target.borrow_mut() = v;
        }
    })
}

fn no_value() -> impl Handler {
    for_type(ValuePolicy::Absent, |_: Option<String>| {})
}

/// A single declared option.
#[derive(Clone)]
pub struct Opt {
    long_key: String,
    short_key: Option<char>,
    description: String,
    handler: Rc<dyn Handler>,
    visibility: Visibility,
    role: Role,
}

impl Opt {
    /// A listed, normal option that takes no value.
    pub fn new(long_key: impl Into<String>, short_key: char, description: impl Into<String>) -> Self {
        Self::build(long_key.into(), Some(short_key), description.into())
    }

    /// An option with only a long key.
    ///
    /// Without a short key the option never sees positional arguments; those only
    /// match an option whose long key is empty, e.g. `hidden(Opt::long("", ..))`.
    pub fn long(long_key: impl Into<String>, description: impl Into<String>) -> Self {
        Self::build(long_key.into(), None, description.into())
    }

    /// An option with only a short key; the long key is derived from it.
    pub fn short(short_key: char, description: impl Into<String>) -> Self {
        Self::build(short_key.to_string(), Some(short_key), description.into())
    }

    fn build(long_key: String, short_key: Option<char>, description: String) -> Self {
        Self {
            long_key,
            short_key,
            description,
            handler: Rc::new(no_value()),
            visibility: Visibility::Listed,
            role: Role::Normal,
        }
    }

    pub fn with_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Rc::new(handler);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Coerce `value` and hand it to this option's handler.
    pub fn set(&self, value: &str) -> Result<()> {
        tracing::trace!(option = %self.long_key, value, "invoking handler");
        self.handler.set(&self.long_key, value)
    }

    /// Whether `key` equals this option's long key or its short key.
    ///
    /// An option without a short key never matches on it.
    pub fn matches(&self, key: &str) -> bool {
        if key == self.long_key {
            return true;
        }
        match self.short_key {
            Some(c) => {
                let mut chars = key.chars();
                chars.next() == Some(c) && chars.next().is_none()
            }
            None => false,
        }
    }

    pub fn long_key(&self) -> &str {
        &self.long_key
    }

    pub fn short_key(&self) -> Option<char> {
        self.short_key
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn policy(&self) -> ValuePolicy {
        self.handler.policy()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_listed(&self) -> bool {
        self.visibility == Visibility::Listed
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl fmt::Debug for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opt")
            .field("long_key", &self.long_key)
            .field("short_key", &self.short_key)
            .field("description", &self.description)
            .field("policy", &self.policy())
            .field("visibility", &self.visibility)
            .field("role", &self.role)
            .finish()
    }
}

/// Hide an option from the help table; it can still be matched.
pub fn hidden(opt: Opt) -> Opt {
    opt.with_visibility(Visibility::Hidden)
}

/// A line of text in the help table.
pub fn text(description: impl Into<String>) -> Opt {
    Opt::long("", description).with_role(Role::Text)
}

/// A section heading in the help table.
pub fn heading(description: impl Into<String>) -> Opt {
    Opt::long("", description).with_role(Role::Heading)
}

/// Ordered collection of options. Order decides both help layout and match precedence.
#[derive(Debug, Clone, Default)]
pub struct Table {
    options: Vec<Opt>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, opt: Opt) {
        self.options.push(opt);
    }

    /// Builder-style [`Table::push`].
    pub fn with(mut self, opt: Opt) -> Self {
        self.push(opt);
        self
    }

    /// Concatenate tables, keeping their order.
    pub fn merge<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Self {
        tables
            .into_iter()
            .flat_map(|table| table.options.iter().cloned())
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&Opt> {
        self.options.get(index)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Opt> {
        self.options.iter()
    }

    /// Index of the first normal option matching `key`.
    pub fn find(&self, key: &str) -> Option<usize> {
        self.options
            .iter()
            .position(|opt| opt.role() == Role::Normal && opt.matches(key))
    }
}

impl From<Vec<Opt>> for Table {
    fn from(options: Vec<Opt>) -> Self {
        Self { options }
    }
}

impl FromIterator<Opt> for Table {
    fn from_iter<I: IntoIterator<Item = Opt>>(iter: I) -> Self {
        Self {
            options: iter.into_iter().collect(),
        }
    }
}

impl Extend<Opt> for Table {
    fn extend<I: IntoIterator<Item = Opt>>(&mut self, iter: I) {
        self.options.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Opt;
    type IntoIter = std::slice::Iter<'a, Opt>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

impl std::ops::Index<usize> for Table {
    type Output = Opt;

    fn index(&self, index: usize) -> &Opt {
        &self.options[index]
    }
}

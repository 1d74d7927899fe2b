//! Matching tokenized arguments against an option table and running the deferred handlers.
//!
//! Scanning only checks that every argument is recognized. Values are coerced when the
//! jobs run, so a pre-run callback can look at what matched (e.g. `--help`) before any
//! value error from an unrelated option gets a chance to abort.

use crate::error::{Error, Result};
use crate::option::{Opt, Table};
use crate::parser::ArgStore;
use std::collections::BTreeMap;
use std::ops::ControlFlow;

/// A matched argument waiting to be run: the index of its option plus the captured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    option: usize,
    key: String,
    value: String,
}

impl Job {
    /// Index of the matched option in the table that was scanned.
    pub fn option_index(&self) -> usize {
        self.option
    }

    /// The argument key as it was given (long or short form).
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A job bound to its option, ready to call.
#[derive(Debug, Clone, Copy)]
pub struct Thunk<'a> {
    option: &'a Opt,
    value: &'a str,
}

impl<'a> Thunk<'a> {
    pub fn option(&self) -> &'a Opt {
        self.option
    }

    pub fn value(&self) -> &'a str {
        self.value
    }

    /// Run the option's handler with the captured value.
    pub fn call(&self) -> Result<()> {
        self.option.set(self.value)
    }
}

/// Jobs produced by one scan, in argument order, tied to the table they index into.
#[derive(Debug, Clone)]
pub struct Jobs<'t> {
    table: &'t Table,
    jobs: Vec<Job>,
}

impl<'t> Jobs<'t> {
    pub fn table(&self) -> &'t Table {
        self.table
    }

    pub fn entries(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// The option a job was matched to.
    pub fn option(&self, job: &Job) -> &'t Opt {
        &self.table[job.option]
    }

    pub fn iter(&self) -> impl Iterator<Item = Thunk<'_>> + '_ {
        self.jobs.iter().map(move |job| Thunk {
            option: self.option(job),
            value: &job.value,
        })
    }

    /// Number of jobs whose option has `key` as its long or short key.
    pub fn count(&self, key: &str) -> usize {
        self.jobs
            .iter()
            .filter(|job| self.option(job).matches(key))
            .count()
    }

    /// Number of jobs per long key.
    pub fn counts(&self) -> BTreeMap<&'t str, usize> {
        let mut counts = BTreeMap::new();
        for job in &self.jobs {
            *counts.entry(self.option(job).long_key()).or_insert(0) += 1;
        }
        counts
    }

    /// All jobs grouped by long key; repeated options keep every occurrence in order.
    pub fn group_by_key(&self) -> BTreeMap<&'t str, Vec<Thunk<'_>>> {
        let mut groups: BTreeMap<&'t str, Vec<Thunk<'_>>> = BTreeMap::new();
        for job in &self.jobs {
            let option = self.option(job);
            groups.entry(option.long_key()).or_default().push(Thunk {
                option,
                value: &job.value,
            });
        }
        groups
    }

    /// Run every job in order, stopping at the first error.
    pub fn run(&self) -> Result<()> {
        for thunk in self.iter() {
            thunk.call()?;
        }
        Ok(())
    }
}

/// What [`scan_and_run`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// All jobs were run.
    Ran,
    /// The pre-run callback cancelled the run; no handler was invoked.
    Vetoed,
}

/// Match every argument against the table.
///
/// The first normal option whose long or short key equals the argument key wins.
/// Fails on the first argument nothing matches; later arguments are not looked at.
pub fn scan<'t>(args: &ArgStore, table: &'t Table) -> Result<Jobs<'t>> {
    let mut jobs = Vec::with_capacity(args.scannable().len());

    for pair in args.scannable() {
        let option = table
            .find(&pair.key)
            .ok_or_else(|| Error::UnrecognizedOption {
                key: pair.key.clone(),
            })?;
        tracing::debug!(
            key = %pair.key,
            option = %table[option].long_key(),
            positional = pair.is_positional(),
            has_value = pair.has_value(),
            "matched argument"
        );
        jobs.push(Job {
            option,
            key: pair.key.clone(),
            value: pair.value.clone(),
        });
    }

    Ok(Jobs { table, jobs })
}

/// Run all jobs in order. See [`Jobs::run`].
pub fn run(jobs: &Jobs<'_>) -> Result<()> {
    jobs.run()
}

/// Number of jobs matching `key`. See [`Jobs::count`].
pub fn count(jobs: &Jobs<'_>, key: &str) -> usize {
    jobs.count(key)
}

/// Jobs grouped by long key. See [`Jobs::group_by_key`].
pub fn group_by_key<'a, 't>(jobs: &'a Jobs<'t>) -> BTreeMap<&'t str, Vec<Thunk<'a>>> {
    jobs.group_by_key()
}

/// Scan, let `pre_run` inspect the jobs, then run them unless it breaks.
pub fn scan_and_run<F>(args: &ArgStore, table: &Table, pre_run: F) -> Result<Outcome>
where
    F: FnOnce(&Jobs<'_>) -> ControlFlow<()>,
{
    let jobs = scan(args, table)?;

    if pre_run(&jobs).is_break() {
        tracing::debug!(jobs = jobs.len(), "pre-run vetoed execution");
        return Ok(Outcome::Vetoed);
    }

    jobs.run()?;
    Ok(Outcome::Ran)
}

/// Scan and run with nothing to veto.
pub fn scan_run(args: &ArgStore, table: &Table) -> Result<()> {
    scan_and_run(args, table, |_| ControlFlow::Continue(())).map(|_| ())
}

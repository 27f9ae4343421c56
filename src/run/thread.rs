//! Spawning player threads.
//!
//! The conductor doesn't care whether its players live on detached threads
//! or on threads scoped to the caller's stack; a [Threader] hides the
//! difference.

use crate::{err, player::Report};
use serde::{Deserialize, Serialize};

/// A job to run on a player thread.
pub type Job<'env> = Box<dyn FnOnce() -> err::Result<Report> + Send + 'env>;

/// Options for spawning player threads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// The stack size, in bytes, to give each player thread.
    ///
    /// If absent, the platform default applies.
    pub stack_size: Option<usize>,
}

/// A handle for waiting on a spawned job.
pub struct Joiner<'h>(Box<dyn FnOnce() -> std::thread::Result<err::Result<Report>> + 'h>);

impl<'h> Joiner<'h> {
    /// Waits for the job to finish, yielding its report.
    ///
    /// `name` identifies the thread if it died without producing one.
    pub fn join(self, name: &str) -> err::Result<Report> {
        (self.0)()
            .map_err(|_| err::Error::PlayerLost(name.to_owned()))
            .and_then(|r| r)
    }
}

/// Trait of things that can spawn player threads.
///
/// `'env` is the lifetime of anything the jobs borrow, and `'h` the lifetime
/// of the resulting join handles.
pub trait Threader<'env, 'h> {
    /// Spawns `job` on a new thread called `name`.
    fn spawn(&self, name: String, job: Job<'env>) -> err::Result<Joiner<'h>>;
}

/// Spawns detached threads; jobs must own everything they use.
#[derive(Clone, Debug, Default)]
pub struct Detached {
    /// Options for each spawned thread.
    pub options: Options,
}

impl Threader<'static, 'static> for Detached {
    fn spawn(&self, name: String, job: Job<'static>) -> err::Result<Joiner<'static>> {
        let mut builder = std::thread::Builder::new().name(name);
        if let Some(size) = self.options.stack_size {
            builder = builder.stack_size(size);
        }
        let handle = builder.spawn(job)?;
        Ok(Joiner(Box::new(move || handle.join())))
    }
}

/// Spawns threads inside a crossbeam scope, so jobs can borrow from the
/// enclosing stack.
pub struct Scoped<'s, 'env> {
    scope: &'s crossbeam::thread::Scope<'env>,
    options: Options,
}

impl<'s, 'env> Scoped<'s, 'env> {
    /// Constructs a threader spawning into `scope`.
    pub fn new(scope: &'s crossbeam::thread::Scope<'env>, options: Options) -> Self {
        Self { scope, options }
    }
}

impl<'s, 'env> Threader<'env, 's> for Scoped<'s, 'env> {
    fn spawn(&self, name: String, job: Job<'env>) -> err::Result<Joiner<'s>> {
        let mut builder = self.scope.builder().name(name);
        if let Some(size) = self.options.stack_size {
            builder = builder.stack_size(size);
        }
        let handle = builder.spawn(move |_| job())?;
        Ok(Joiner(Box::new(move || handle.join())))
    }
}

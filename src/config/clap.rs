//! `clap` integration for config.

use super::{err, order, top};
use crate::{run::thread, ux::out};
use std::str::FromStr;

pub mod arg {
    /// Name of the score file argument.
    pub const SCORE: &str = "SCORE";
    /// Name of the `config` argument.
    pub const CONFIG: &str = "config";
    /// Name of the `order` argument.
    pub const ORDER: &str = "order";
    /// Name of the `seed` argument.
    pub const SEED: &str = "seed";
    /// Name of the `output` argument.
    pub const OUTPUT: &str = "output";
    /// Name of the `stack-size` argument.
    pub const STACK_SIZE: &str = "stack-size";
    /// Name of the `dump-config` argument.
    pub const DUMP_CONFIG: &str = "dump-config";
}

/// Trait for things that can be updated from command line arguments taken from
/// `clap`.
pub trait Clappable: Sized {
    /// Merges configuration from a clap match dictionary into this, potentially
    /// replacing it entirely.
    fn parse_clap(self, matches: &clap::ArgMatches) -> err::Result<Self>;
}

/// We can fill a top-level config using clap.
impl Clappable for top::Config {
    fn parse_clap(self, matches: &clap::ArgMatches) -> err::Result<Self> {
        Ok(Self {
            order: self.order.parse_clap(matches)?,
            seed: parse_opt_or(matches.value_of(arg::SEED), self.seed)
                .map_err(err::Error::BadSeed)?,
            output: self.output.parse_clap(matches)?,
            thread: self.thread.parse_clap(matches)?,
        })
    }
}

/// We can fill an order strategy using clap.
impl Clappable for order::Strategy {
    fn parse_clap(self, matches: &clap::ArgMatches) -> err::Result<Self> {
        parse_or(matches.value_of(arg::ORDER), self)
    }
}

/// We can fill an output choice using clap.
impl Clappable for out::Choice {
    fn parse_clap(self, matches: &clap::ArgMatches) -> err::Result<Self> {
        matches.value_of(arg::OUTPUT).map_or(Ok(self), |s| {
            s.parse()
                .map_err(|_| err::Error::BadOutput(s.to_owned()))
        })
    }
}

/// We can fill thread options using clap.
impl Clappable for thread::Options {
    fn parse_clap(self, matches: &clap::ArgMatches) -> err::Result<Self> {
        Ok(Self {
            stack_size: parse_opt_or(matches.value_of(arg::STACK_SIZE), self.stack_size)
                .map_err(err::Error::BadStackSize)?,
        })
    }
}

fn parse_or<T: FromStr>(s: Option<&str>, default: T) -> std::result::Result<T, T::Err> {
    s.map_or(Ok(default), |s| s.parse())
}

fn parse_opt_or<T: FromStr>(s: Option<&str>, default: Option<T>) -> std::result::Result<Option<T>, T::Err> {
    s.map_or(Ok(default), |s| s.parse().map(Some))
}

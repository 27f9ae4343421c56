//! Abstract interface for outputters.

use super::err;
use crate::score::Performance;

/// Trait of things that can output a performance.
pub trait Outputter {
    /// Outputs the performance `p`, flushing and returning any errors arising.
    ///
    /// This trait consumes the outputter, as there is no guarantee that any
    /// underlying resources can be used multiple times.
    fn output(self: Box<Self>, p: Performance) -> err::Result<()>;
}

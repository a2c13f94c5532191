//! # periodid
//!
//! Ordered, collision-free numeric identifiers minted locally by independent
//! workers.
//!
//! Every generator combines a per-period *baseline* (date digits or elapsed
//! time, plus the worker id) with a per-period counter. A background clock
//! task rotates the baseline when the period rolls over; a serializer task
//! hands out `baseline + counter` to any number of concurrent callers.
//!
//! ```no_run
//! # async fn run() -> periodid::Result<()> {
//! use periodid::{PeriodId, ShortOrderGenerator, Zone};
//!
//! let generator = ShortOrderGenerator::new(1, Zone::resolve(None))?;
//! let id = generator.next_id().await?;
//! println!("{id} -> {:?}", id.components());
//! generator.shutdown();
//! # Ok(())
//! # }
//! ```
mod error;
mod generator;
mod id;
mod scheme;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::scheme::*;
pub use crate::time::*;

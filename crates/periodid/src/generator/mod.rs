mod buffer;
mod clock;
mod handle;
mod serializer;

pub(crate) use buffer::*;
pub(crate) use clock::*;
pub use handle::*;
pub(crate) use serializer::*;

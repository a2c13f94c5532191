mod interface;
mod order;
mod sequence;
mod snowflake;

pub use interface::*;
pub use order::*;
pub use sequence::*;
pub use snowflake::*;

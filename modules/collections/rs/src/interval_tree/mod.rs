pub use bits::{Bits, BitsBuilder};
pub use tree::{Builder, ITree};

mod bits;
pub mod tree;

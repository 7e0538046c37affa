pub use lookup::LookupError;

pub mod loc;
mod lookup;
pub mod num;
pub mod parallelism;
pub mod seq;

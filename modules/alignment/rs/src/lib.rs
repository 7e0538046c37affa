pub mod scoring;
pub mod split;

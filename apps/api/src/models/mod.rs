pub mod annotation;
pub mod candidate;

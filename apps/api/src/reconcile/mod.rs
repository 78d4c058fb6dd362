// Excerpt-to-source reconciliation.
// Pure, synchronous transforms over in-memory strings: locate → plan → segments / replace.
// Nothing here keeps state between calls; callers hold the current document.

pub mod cross_ref;
pub mod locator;
pub mod plan;
pub mod replace;
pub mod segments;
pub mod span;

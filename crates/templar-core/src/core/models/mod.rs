//! Plain data carried through template selection: query domains, structure
//! candidates, pairwise alignments and the resulting templates.

pub mod alignment;
pub mod candidate;
pub mod domain;
pub mod template;

//! Prompt construction for the three translation stages.
//!
//! Every builder is a pure function of its arguments. User text is embedded
//! verbatim between XML-style tags and is never escaped; use
//! [`delimiter_collisions`] to detect input that contains those tags.

mod builder;
mod dimensions;
mod template;

pub use builder::{
    build_improvement, build_initial_translation, build_reflection, delimiter_collisions, Prompt,
    DELIMITER_TAGS,
};
pub use dimensions::CritiqueDimension;
pub use template::{PromptTemplate, Slot, SlotValues};

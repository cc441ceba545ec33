//! XML handling: roxmltree helpers and the owned markup model.
//!
//! Documents are parsed with roxmltree and converted into [`MarkupElement`]
//! trees, which outlive the borrowed DOM and can be spliced (includes) and
//! filtered before components are built.

mod attributes;
pub mod markup;
pub mod utils;

pub use attributes::{Attribute, Attributes};
pub use markup::{parse_markup, MarkupElement};
pub use utils::{element_children, location_of, qualified_name};

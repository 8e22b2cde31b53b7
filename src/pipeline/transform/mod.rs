//! Document transforms.
//!
//! | Transform     | Purpose                                              |
//! |---------------|------------------------------------------------------|
//! | `CodeWrapper` | Wrap `pre > code` blocks with a copy button + label  |

mod code;

pub use code::{
    CodeWrapper, CodeWrapperConfig, LANGUAGE_ATTR, LanguageLabels, PLAINTEXT, wrap_code_blocks,
};

// Template rendering: Document + LayoutTokens → render tree → HTML.
// Templates only arrange content; spacing and font size always come from the tokens.

pub mod html;
pub mod registry;
pub mod template;
pub mod templates;
pub mod tree;

pub use registry::{TemplateRegistry, DEFAULT_TEMPLATE_ID};
pub use template::{Template, TemplateMeta};
pub use tree::Page;

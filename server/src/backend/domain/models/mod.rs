pub mod note;
pub mod template;

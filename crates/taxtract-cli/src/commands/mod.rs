pub mod extract;
pub mod templates;

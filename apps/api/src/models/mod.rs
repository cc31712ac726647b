pub mod item;
pub mod seo;

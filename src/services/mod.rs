pub mod browser;
pub mod debounce;
pub mod editor;
pub mod export;
pub mod normalizer;
pub mod output_formatter;
pub mod query;
pub mod reorder;
pub mod screen;

pub mod gallery;

pub use gallery::{GalleryEntry, NamesPage, Page, PageRequest};

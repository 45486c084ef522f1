pub mod feed_loader;
pub mod xml_loader;

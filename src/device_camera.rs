pub mod impl_fake;
pub mod impl_image_directory;
pub mod interface;

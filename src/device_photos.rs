pub mod impl_desktop;
#[cfg(test)]
pub mod impl_fake;
pub mod interface;

pub mod catalog;
pub mod device;
pub mod error;
pub mod fs;
pub mod layout;
pub mod path;

#[cfg(test)]
mod test_utils;

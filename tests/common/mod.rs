pub mod documents;
#[cfg(feature = "integration-tests")]
#[macro_use]
pub mod test_utils;

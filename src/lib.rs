pub mod config;
pub mod gateway;
pub mod inference;
pub mod prompts;

#[cfg(test)]
pub(crate) mod test_support;

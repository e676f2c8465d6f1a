pub mod types;

pub(crate) mod query;
pub(crate) mod mutation;

#[cfg(test)]
mod tests;

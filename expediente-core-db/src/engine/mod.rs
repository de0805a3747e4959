pub mod workflow;

pub use workflow::*;

#[cfg(test)]
mod tests;

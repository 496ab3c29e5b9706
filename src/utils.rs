pub mod fs;

#[cfg(test)]
pub mod fixtures;

pub mod locations;
pub mod sessions;
pub mod trips;

#[cfg(test)]
mod fake;

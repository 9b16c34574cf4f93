mod base;
mod builder;
mod combine;
mod subset;

pub use base::*;
pub use builder::*;
pub use combine::*;

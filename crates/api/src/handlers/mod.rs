pub mod aliases;
pub mod convert;

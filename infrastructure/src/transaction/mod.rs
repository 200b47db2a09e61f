//! Lead transaction adapters

mod command;

pub use command::CommandLeadTransaction;

pub mod account;
pub mod error;
pub mod executor;
pub mod observable;
pub mod task;

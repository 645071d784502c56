pub mod candy_machine;
pub mod cli;
pub mod common;
pub mod constants;
pub mod errors;
pub mod mint;
pub mod parse;
pub mod pdas;
pub mod rpc;
pub mod setup;
pub mod show;
pub mod transactions;
pub mod utils;

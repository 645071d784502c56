use anchor_client::solana_sdk::{program_error::ProgramError, signer::SignerError};
use thiserror::Error;

use crate::rpc::RpcError;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to read keypair file: {0}")]
    InvalidKeypairFile(String),

    #[error(
        "No candy machine address given. Pass --candy-machine or set the \
         CANDY_MACHINE_ID environment variable."
    )]
    MissingCandyMachineAddress,

    #[error("Invalid candy machine address: {0}")]
    InvalidCandyMachineAddress(String),
}

#[derive(Debug, Error)]
pub enum MintError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("Failed to build instruction: {0}")]
    Instruction(#[from] ProgramError),

    #[error("Candy machine account not found: {0}")]
    MachineNotFound(String),

    #[error("Failed to deserialize candy machine state: {0}")]
    InvalidMachineState(String),

    #[error("Failed to deserialize collection account: {0}")]
    InvalidCollectionState(String),

    #[error("Candy machine is sold out.")]
    SoldOut,

    #[error("Mint is not live yet.")]
    NotLive,

    #[error("Mint has ended.")]
    Ended,

    #[error("{0} item(s) available, requested {1}")]
    NotEnoughItems(u64, u64),
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("No wallet connected.")]
    WalletNotConnected,

    #[error("Failed to sign transaction: {0}")]
    Signer(#[from] SignerError),
}

pub use anchor_client::solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_instruction, system_program, sysvar,
    transaction::Transaction,
};
pub use anchor_lang::AccountDeserialize;
pub use anyhow::{anyhow, Result};
pub use serde::Deserialize;
pub use std::{
    collections::HashMap,
    fs::File,
    path::{Path, PathBuf},
    str::FromStr,
};
pub use tracing::{debug, error, info, warn};

pub use mpl_candy_machine::accounts as nft_accounts;
pub use mpl_candy_machine::instruction as nft_instruction;
pub use mpl_candy_machine::{CandyMachine, WhitelistMintMode, ID as CANDY_MACHINE_PROGRAM_ID};

pub use crate::constants::*;
pub use crate::errors::*;
pub use crate::setup::{praline_setup, setup_rpc};

use std::{env, str::FromStr};

use anchor_client::solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
};

use crate::constants::{CANDY_MACHINE_ENV, DEFAULT_RPC_URL};
use crate::errors::SetupError;
use crate::parse::parse_solana_config;
use crate::rpc::SolanaRpc;

pub struct PralineConfig {
    pub keypair: Keypair,
    pub rpc_url: String,
}

/// Resolves the signing keypair and RPC endpoint. Command line flags win,
/// then the solana CLI config, then the stock defaults.
pub fn praline_setup(
    keypair_opt: Option<String>,
    rpc_url_opt: Option<String>,
) -> Result<PralineConfig, SetupError> {
    let sol_config_option = parse_solana_config();

    let rpc_url = match rpc_url_opt {
        Some(rpc_url) => rpc_url,
        None => match sol_config_option {
            Some(ref sol_config) => sol_config.json_rpc_url.clone(),
            None => String::from(DEFAULT_RPC_URL),
        },
    };

    let keypair_path = match keypair_opt {
        Some(keypair_path) => keypair_path,
        None => match sol_config_option {
            Some(ref sol_config) => sol_config.keypair_path.clone(),
            None => shellexpand::tilde("~/.config/solana/id.json").to_string(),
        },
    };

    let keypair = read_keypair_file(&keypair_path)
        .map_err(|_| SetupError::InvalidKeypairFile(keypair_path))?;

    Ok(PralineConfig { keypair, rpc_url })
}

pub fn setup_rpc(config: &PralineConfig) -> SolanaRpc {
    SolanaRpc::new(config.rpc_url.clone(), CommitmentConfig::confirmed())
}

/// Resolves the machine address from the command line or the environment.
pub fn candy_machine_id_from_options(
    candy_machine_opt: Option<String>,
) -> Result<Pubkey, SetupError> {
    let address = match candy_machine_opt.or_else(|| env::var(CANDY_MACHINE_ENV).ok()) {
        Some(address) => address,
        None => return Err(SetupError::MissingCandyMachineAddress),
    };

    Pubkey::from_str(&address).map_err(|_| SetupError::InvalidCandyMachineAddress(address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candy_machine_flag_parses() {
        let address = Pubkey::new_unique();
        let parsed = candy_machine_id_from_options(Some(address.to_string())).unwrap();
        assert_eq!(parsed, address);
    }

    #[test]
    fn malformed_candy_machine_address_is_rejected() {
        let err = candy_machine_id_from_options(Some("not-a-pubkey".to_string())).unwrap_err();
        assert!(matches!(err, SetupError::InvalidCandyMachineAddress(_)));
    }

    #[test]
    fn missing_candy_machine_address_is_reported() {
        env::remove_var(CANDY_MACHINE_ENV);
        let err = candy_machine_id_from_options(None).unwrap_err();
        assert!(matches!(err, SetupError::MissingCandyMachineAddress));
    }
}

use anchor_client::solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};
use async_trait::async_trait;
use solana_client::{client_error::ClientError, nonblocking::rpc_client::RpcClient};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("ClientError: {0}")]
    ClientError(#[from] Box<ClientError>),

    #[error("Error: `{0}`")]
    CustomError(String),
}

impl From<ClientError> for RpcError {
    fn from(err: ClientError) -> Self {
        RpcError::ClientError(Box::new(err))
    }
}

/// Read and submit interface against the chain. Every call is a suspension
/// point; callers decide whether a failure is fatal or degradable.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, RpcError>;

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError>;

    /// Token balance of an associated token account, in base units.
    async fn get_token_balance(&self, address: &Pubkey) -> Result<u64, RpcError>;

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError>;

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, RpcError>;
}

/// Live connection over the nonblocking RPC client. The commitment level is
/// fixed at construction and applies to every read and confirmation.
pub struct SolanaRpc {
    client: RpcClient,
}

impl SolanaRpc {
    pub fn new(url: String, commitment: CommitmentConfig) -> Self {
        let client = RpcClient::new_with_commitment(url, commitment);
        Self { client }
    }
}

#[async_trait]
impl ChainClient for SolanaRpc {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, RpcError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError> {
        Ok(self.client.get_balance(address).await?)
    }

    async fn get_token_balance(&self, address: &Pubkey) -> Result<u64, RpcError> {
        let amount = self.client.get_token_account_balance(address).await?;
        amount
            .amount
            .parse::<u64>()
            .map_err(|err| RpcError::CustomError(format!("Invalid token amount: {}", err)))
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError> {
        Ok(self
            .client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, RpcError> {
        Ok(self.client.send_and_confirm_transaction(transaction).await?)
    }
}

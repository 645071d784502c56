use anchor_client::solana_sdk::{
    instruction::Instruction,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use tracing::error;

use crate::errors::SendError;
use crate::rpc::{ChainClient, RpcError};

/// Ordered operations plus the signers they need beyond the fee payer.
pub struct TransactionBundle {
    pub instructions: Vec<Instruction>,
    pub signers: Vec<Keypair>,
}

impl TransactionBundle {
    pub fn new(instructions: Vec<Instruction>, signers: Vec<Keypair>) -> Self {
        Self {
            instructions,
            signers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Signs and submits a batch of bundles: one blockhash for the whole batch,
/// each bundle partially signed by its own signers, a single co-signing pass
/// by the fee payer, then sequential send-and-confirm in order. `progress`
/// fires per bundle when it is staged (no signature yet) and again when it
/// confirms; `failure` fires instead when a bundle is rejected. A rejected
/// bundle does not stop the ones after it. Both callbacks receive the
/// bundle's index in the input list. A payer with no reachable public key
/// aborts the whole batch before anything is staged. Returns the signatures
/// of the bundles that confirmed.
pub async fn send_bundles<S, P, F>(
    client: &dyn ChainClient,
    payer: &S,
    bundles: Vec<TransactionBundle>,
    mut progress: P,
    mut failure: F,
) -> Result<Vec<Signature>, SendError>
where
    S: Signer,
    P: FnMut(usize, &Transaction, Option<&Signature>),
    F: FnMut(usize, &Transaction, &RpcError),
{
    let payer_pubkey = payer
        .try_pubkey()
        .map_err(|_| SendError::WalletNotConnected)?;
    let blockhash = client.get_latest_blockhash().await?;

    let mut staged: Vec<(usize, Transaction)> = Vec::new();
    for (index, bundle) in bundles.iter().enumerate() {
        if bundle.is_empty() {
            continue;
        }

        let mut transaction =
            Transaction::new_with_payer(&bundle.instructions, Some(&payer_pubkey));
        if !bundle.signers.is_empty() {
            let signers: Vec<&Keypair> = bundle.signers.iter().collect();
            transaction.try_partial_sign(&signers, blockhash)?;
        }

        progress(index, &transaction, None);
        staged.push((index, transaction));
    }

    // One co-signing pass over the whole batch before anything is sent.
    for (_, transaction) in staged.iter_mut() {
        transaction.try_partial_sign(&[payer], blockhash)?;
    }

    let mut confirmed = Vec::new();
    for (index, transaction) in &staged {
        match client.send_and_confirm_transaction(transaction).await {
            Ok(signature) => {
                progress(*index, transaction, Some(&signature));
                confirmed.push(signature);
            }
            Err(err) => {
                error!("Transaction failed: {}", err);
                failure(*index, transaction, &err);
            }
        }
    }

    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anchor_client::solana_sdk::{
        pubkey::Pubkey, signer::SignerError, system_instruction,
    };

    use super::*;
    use crate::rpc::mock::MockChain;

    fn transfer_bundle(payer: &Keypair) -> TransactionBundle {
        let instruction =
            system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        TransactionBundle::new(vec![instruction], vec![])
    }

    struct DisconnectedWallet;

    impl Signer for DisconnectedWallet {
        fn try_pubkey(&self) -> Result<Pubkey, SignerError> {
            Err(SignerError::NoDeviceFound)
        }

        fn try_sign_message(&self, _message: &[u8]) -> Result<Signature, SignerError> {
            Err(SignerError::NoDeviceFound)
        }

        fn is_interactive(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn bundles_confirm_in_order() {
        let chain = MockChain::default();
        let payer = Keypair::new();
        let bundles = vec![transfer_bundle(&payer), transfer_bundle(&payer)];

        let events = RefCell::new(Vec::new());
        let confirmed = send_bundles(
            &chain,
            &payer,
            bundles,
            |index, _transaction: &Transaction, result: Option<&Signature>| {
                events.borrow_mut().push((index, result.is_some()));
            },
            |index, _transaction: &Transaction, _err: &RpcError| {
                events.borrow_mut().push((index, false));
                panic!("no bundle should fail");
            },
        )
        .await
        .unwrap();

        assert_eq!(confirmed.len(), 2);
        assert_eq!(
            events.into_inner(),
            vec![(0, false), (1, false), (0, true), (1, true)]
        );
    }

    #[tokio::test]
    async fn rejected_bundle_does_not_stop_the_rest() {
        let mut chain = MockChain::default();
        chain.failed_sends.insert(1);
        let payer = Keypair::new();
        let bundles = vec![
            transfer_bundle(&payer),
            transfer_bundle(&payer),
            transfer_bundle(&payer),
        ];

        let confirmations = RefCell::new(Vec::new());
        let failures = RefCell::new(Vec::new());
        let confirmed = send_bundles(
            &chain,
            &payer,
            bundles,
            |index, _transaction: &Transaction, result: Option<&Signature>| {
                if result.is_some() {
                    confirmations.borrow_mut().push(index);
                }
            },
            |index, _transaction: &Transaction, _err: &RpcError| {
                failures.borrow_mut().push(index);
            },
        )
        .await
        .unwrap();

        assert_eq!(confirmed.len(), 2);
        assert_eq!(confirmations.into_inner(), vec![0, 2]);
        assert_eq!(failures.into_inner(), vec![1]);
    }

    #[tokio::test]
    async fn empty_bundles_are_skipped_but_keep_indexes() {
        let chain = MockChain::default();
        let payer = Keypair::new();
        let bundles = vec![
            TransactionBundle::new(vec![], vec![]),
            transfer_bundle(&payer),
        ];

        let events = RefCell::new(Vec::new());
        let confirmed = send_bundles(
            &chain,
            &payer,
            bundles,
            |index, _transaction: &Transaction, result: Option<&Signature>| {
                events.borrow_mut().push((index, result.is_some()));
            },
            |_index, _transaction: &Transaction, _err: &RpcError| {},
        )
        .await
        .unwrap();

        assert_eq!(confirmed.len(), 1);
        assert_eq!(events.into_inner(), vec![(1, false), (1, true)]);
        assert_eq!(chain.send_count(), 1);
    }

    #[tokio::test]
    async fn missing_payer_identity_aborts_before_any_send() {
        let chain = MockChain::default();
        let helper = Keypair::new();
        let bundles = vec![transfer_bundle(&helper)];

        let result = send_bundles(
            &chain,
            &DisconnectedWallet,
            bundles,
            |_index, _transaction: &Transaction, _result: Option<&Signature>| {
                panic!("nothing should be staged");
            },
            |_index, _transaction: &Transaction, _err: &RpcError| {},
        )
        .await;

        assert!(matches!(result, Err(SendError::WalletNotConnected)));
        assert_eq!(chain.send_count(), 0);
    }

    #[tokio::test]
    async fn bundle_signers_and_payer_both_sign() {
        let chain = MockChain::default();
        let payer = Keypair::new();
        let mint = Keypair::new();
        let instruction = system_instruction::create_account(
            &payer.pubkey(),
            &mint.pubkey(),
            1_000_000,
            82,
            &spl_token::ID,
        );
        let bundles = vec![TransactionBundle::new(vec![instruction], vec![mint])];

        let fully_signed = RefCell::new(false);
        let payer_key = payer.pubkey();
        send_bundles(
            &chain,
            &payer,
            bundles,
            |_index, transaction: &Transaction, result: Option<&Signature>| {
                if result.is_some() {
                    assert_eq!(transaction.message.account_keys[0], payer_key);
                    *fully_signed.borrow_mut() = transaction.is_signed();
                }
            },
            |_index, _transaction: &Transaction, _err: &RpcError| {},
        )
        .await
        .unwrap();

        assert!(fully_signed.into_inner());
    }
}

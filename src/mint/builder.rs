use anchor_client::solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction, system_program, sysvar,
};
use anchor_lang::{AccountDeserialize, InstructionData, ToAccountMetas};
use futures::future::try_join_all;
use spl_associated_token_account::create_associated_token_account;
use spl_token::{
    instruction::{initialize_mint, mint_to},
    ID as TOKEN_PROGRAM_ID,
};
use tracing::warn;

use mpl_candy_machine::accounts as nft_accounts;
use mpl_candy_machine::instruction as nft_instruction;
use mpl_candy_machine::{CandyMachine, CollectionPDA, WhitelistMintMode};

use crate::constants::{CIVIC, MINT_LAYOUT};
use crate::errors::MintError;
use crate::pdas::{
    find_candy_machine_creator_pda, find_collection_authority_record_pda, find_collection_pda,
    find_master_edition_pda, find_metadata_pda, find_network_expire_pda, find_network_token_pda,
    get_ata_for_mint,
};
use crate::rpc::ChainClient;
use crate::transactions::TransactionBundle;

/// Working byte ceiling for a single serialized transaction. Two bytes under
/// the wire maximum to leave room for the signature count prefix.
pub const MAX_TRANSACTION_BYTES: usize = 1230;

/// Empirical wire sizes for the mint operations, in bytes. These track the
/// machine program's current instruction encoding and are calibration data
/// rather than derived truth; re-measure them if the program changes its
/// account layout.
#[derive(Debug, Clone)]
pub struct TransactionSizes {
    pub base: usize,
    pub collection_link: usize,
    pub spl_payment: usize,
    pub whitelist: usize,
    pub whitelist_burn: usize,
    pub gateway: usize,
    pub gateway_expire: usize,
}

impl Default for TransactionSizes {
    fn default() -> Self {
        Self {
            base: 892,
            collection_link: 182,
            spl_payment: 66,
            whitelist: 34,
            whitelist_burn: 34,
            gateway: 33,
            gateway_expire: 66,
        }
    }
}

/// Fixed program identities and size calibration for one machine deployment.
/// Built once and shared by every plan in a batch; the fields are public so
/// tests and non-mainnet deployments can swap individual programs.
#[derive(Debug, Clone)]
pub struct MintContext {
    pub candy_machine_id: Pubkey,
    pub candy_machine_program: Pubkey,
    pub token_metadata_program: Pubkey,
    pub gateway_program: Pubkey,
    pub sizes: TransactionSizes,
}

impl MintContext {
    pub fn new(candy_machine_id: Pubkey) -> Self {
        Self {
            candy_machine_id,
            candy_machine_program: mpl_candy_machine::ID,
            token_metadata_program: mpl_token_metadata::ID,
            gateway_program: CIVIC.parse().expect("Failed to parse PID"),
            sizes: TransactionSizes::default(),
        }
    }
}

/// Side accounts appended to the mint operation. The machine program reads
/// these by position, so each optional feature appends through its own
/// method and the call order is part of the contract: gateway accounts,
/// then allow-list accounts, then payment accounts.
#[derive(Debug, Default)]
pub struct RemainingAccounts {
    metas: Vec<AccountMeta>,
}

impl RemainingAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_gateway_token(&mut self, address: Pubkey) {
        self.metas.push(AccountMeta {
            pubkey: address,
            is_signer: false,
            is_writable: true,
        });
    }

    pub fn push_gateway_program(&mut self, address: Pubkey) {
        self.metas.push(AccountMeta {
            pubkey: address,
            is_signer: false,
            is_writable: false,
        });
    }

    pub fn push_network_expire(&mut self, address: Pubkey) {
        self.metas.push(AccountMeta {
            pubkey: address,
            is_signer: false,
            is_writable: false,
        });
    }

    pub fn push_whitelist_token(&mut self, address: Pubkey) {
        self.metas.push(AccountMeta {
            pubkey: address,
            is_signer: false,
            is_writable: true,
        });
    }

    pub fn push_whitelist_mint(&mut self, address: Pubkey) {
        self.metas.push(AccountMeta {
            pubkey: address,
            is_signer: false,
            is_writable: true,
        });
    }

    pub fn push_wallet_signer(&mut self, address: Pubkey) {
        self.metas.push(AccountMeta {
            pubkey: address,
            is_signer: true,
            is_writable: false,
        });
    }

    pub fn push_paying_token(&mut self, address: Pubkey) {
        self.metas.push(AccountMeta {
            pubkey: address,
            is_signer: false,
            is_writable: true,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }

    pub fn metas(&self) -> &[AccountMeta] {
        &self.metas
    }

    pub fn into_metas(self) -> Vec<AccountMeta> {
        self.metas
    }
}

/// Outcome of the collection lookup for one plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionLink {
    /// The machine has no collection to link.
    None,
    /// A set-collection operation is attached for this collection mint.
    Linked(Pubkey),
    /// A collection account exists but could not be read; the mint proceeds
    /// without the link.
    Unavailable,
}

/// Everything needed to mint one item: the item's fresh mint identity, the
/// ordered operation list, the signers those operations require beyond the
/// wallet itself, and the side accounts attached to the mint operation.
pub struct MintPlan {
    pub mint: Pubkey,
    pub operations: Vec<Instruction>,
    pub signers: Vec<Keypair>,
    pub side_accounts: Vec<AccountMeta>,
    pub collection: CollectionLink,
    pub estimate: usize,
}

impl MintPlan {
    /// The first four operations set up the mint account and need only the
    /// mint keypair; everything after runs against the machine with the
    /// wallet co-signing. Oversized plans split on that boundary.
    pub fn into_bundles(mut self) -> Vec<TransactionBundle> {
        if self.estimate > MAX_TRANSACTION_BYTES {
            let remainder = self.operations.split_off(4);
            let remainder_signers = self.signers.split_off(1);

            vec![
                TransactionBundle::new(self.operations, self.signers),
                TransactionBundle::new(remainder, remainder_signers),
            ]
        } else {
            vec![TransactionBundle::new(self.operations, self.signers)]
        }
    }
}

/// Assembles the operations to mint one item from the machine: four setup
/// operations for the fresh mint account, the mint operation itself with any
/// side accounts the machine settings call for, and a set-collection
/// operation when the machine has a readable collection. Everything here is
/// fatal except the collection lookup, which degrades to a plan without the
/// link.
pub async fn build_mint_plan(
    ctx: &MintContext,
    client: &dyn ChainClient,
    state: &CandyMachine,
    payer: &Pubkey,
) -> Result<MintPlan, MintError> {
    let sizes = &ctx.sizes;
    let candy_machine_data = &state.data;

    let nft_mint = Keypair::new();
    let nft_token = get_ata_for_mint(&nft_mint.pubkey(), payer);

    let min_rent = client
        .get_minimum_balance_for_rent_exemption(MINT_LAYOUT as usize)
        .await?;

    // Create mint account
    let create_mint_account_ix = system_instruction::create_account(
        payer,
        &nft_mint.pubkey(),
        min_rent,
        MINT_LAYOUT,
        &TOKEN_PROGRAM_ID,
    );

    // Initialize mint ix
    let init_mint_ix = initialize_mint(
        &TOKEN_PROGRAM_ID,
        &nft_mint.pubkey(),
        payer,
        Some(payer),
        0,
    )?;

    // Create associated account instruction
    let create_assoc_account_ix = create_associated_token_account(payer, payer, &nft_mint.pubkey());

    // Mint to instruction
    let mint_to_ix = mint_to(&TOKEN_PROGRAM_ID, &nft_mint.pubkey(), &nft_token, payer, &[], 1)?;

    let mut operations = vec![
        create_mint_account_ix,
        init_mint_ix,
        create_assoc_account_ix,
        mint_to_ix,
    ];

    let mut side_accounts = RemainingAccounts::new();
    let mut estimate = sizes.base;

    // Check gatekeeper settings
    if let Some(gatekeeper) = &candy_machine_data.gatekeeper {
        let network_token =
            find_network_token_pda(payer, &gatekeeper.gatekeeper_network, &ctx.gateway_program);
        side_accounts.push_gateway_token(network_token);
        estimate += sizes.gateway;

        if gatekeeper.expire_on_use {
            let network_expire =
                find_network_expire_pda(&gatekeeper.gatekeeper_network, &ctx.gateway_program);
            side_accounts.push_gateway_program(ctx.gateway_program);
            side_accounts.push_network_expire(network_expire);
            estimate += sizes.gateway_expire;
        }
    }

    // Check whitelist mint settings
    if let Some(wl_mint_settings) = &candy_machine_data.whitelist_mint_settings {
        let whitelist_token = get_ata_for_mint(&wl_mint_settings.mint, payer);
        side_accounts.push_whitelist_token(whitelist_token);
        estimate += sizes.whitelist;

        if wl_mint_settings.mode == WhitelistMintMode::BurnEveryTime {
            side_accounts.push_whitelist_mint(wl_mint_settings.mint);
            side_accounts.push_wallet_signer(*payer);
            estimate += sizes.whitelist_burn;
        }
    }

    // Check token mint
    if let Some(token_mint) = state.token_mint {
        let paying_token = get_ata_for_mint(&token_mint, payer);
        side_accounts.push_paying_token(paying_token);
        side_accounts.push_wallet_signer(*payer);
        estimate += sizes.spl_payment;
    }

    let metadata = find_metadata_pda(&nft_mint.pubkey(), &ctx.token_metadata_program);
    let master_edition = find_master_edition_pda(&nft_mint.pubkey(), &ctx.token_metadata_program);
    let (candy_machine_creator, creator_bump) =
        find_candy_machine_creator_pda(&ctx.candy_machine_id, &ctx.candy_machine_program);

    let mut accounts = nft_accounts::MintNFT {
        candy_machine: ctx.candy_machine_id,
        candy_machine_creator,
        payer: *payer,
        wallet: state.wallet,
        metadata,
        mint: nft_mint.pubkey(),
        mint_authority: *payer,
        update_authority: *payer,
        master_edition,
        token_metadata_program: ctx.token_metadata_program,
        token_program: TOKEN_PROGRAM_ID,
        system_program: system_program::id(),
        rent: sysvar::rent::ID,
        clock: sysvar::clock::ID,
        recent_blockhashes: sysvar::slot_hashes::ID,
        instruction_sysvar_account: sysvar::instructions::ID,
    }
    .to_account_metas(None);
    accounts.extend(side_accounts.metas().iter().cloned());

    operations.push(Instruction {
        program_id: ctx.candy_machine_program,
        data: nft_instruction::MintNft { creator_bump }.data(),
        accounts,
    });

    let collection = if candy_machine_data.retain_authority {
        match collection_op(ctx, client, state, &metadata, payer).await {
            Ok(Some((instruction, collection_mint))) => {
                operations.push(instruction);
                estimate += sizes.collection_link;
                CollectionLink::Linked(collection_mint)
            }
            Ok(None) => CollectionLink::None,
            Err(err) => {
                warn!("Failed to attach collection to mint: {}", err);
                CollectionLink::Unavailable
            }
        }
    } else {
        CollectionLink::None
    };

    Ok(MintPlan {
        mint: nft_mint.pubkey(),
        operations,
        signers: vec![nft_mint],
        side_accounts: side_accounts.into_metas(),
        collection,
        estimate,
    })
}

/// Builds `count` independent plans, each with its own fresh mint identity.
/// Plans carry no shared state and are built concurrently; any fatal failure
/// aborts the whole batch.
pub async fn build_mint_plans(
    ctx: &MintContext,
    client: &dyn ChainClient,
    state: &CandyMachine,
    payer: &Pubkey,
    count: u64,
) -> Result<Vec<MintPlan>, MintError> {
    try_join_all((0..count).map(|_| build_mint_plan(ctx, client, state, payer))).await
}

/// Builds the set-collection operation for machines with a collection
/// account. `Ok(None)` means no collection account exists on chain.
async fn collection_op(
    ctx: &MintContext,
    client: &dyn ChainClient,
    state: &CandyMachine,
    metadata: &Pubkey,
    payer: &Pubkey,
) -> Result<Option<(Instruction, Pubkey)>, MintError> {
    let (collection_pda, _) =
        find_collection_pda(&ctx.candy_machine_id, &ctx.candy_machine_program);

    let account = match client.get_account(&collection_pda).await? {
        Some(account) => account,
        None => return Ok(None),
    };

    let collection = CollectionPDA::try_deserialize(&mut account.data.as_slice())
        .map_err(|_| MintError::InvalidCollectionState(collection_pda.to_string()))?;

    let collection_metadata = find_metadata_pda(&collection.mint, &ctx.token_metadata_program);
    let collection_master_edition =
        find_master_edition_pda(&collection.mint, &ctx.token_metadata_program);
    let collection_authority_record = find_collection_authority_record_pda(
        &collection.mint,
        &collection_pda,
        &ctx.token_metadata_program,
    );

    let accounts = nft_accounts::SetCollectionDuringMint {
        candy_machine: ctx.candy_machine_id,
        metadata: *metadata,
        payer: *payer,
        collection_pda,
        token_metadata_program: ctx.token_metadata_program,
        instructions: sysvar::instructions::ID,
        collection_mint: collection.mint,
        collection_metadata,
        collection_master_edition,
        authority: state.authority,
        collection_authority_record,
    }
    .to_account_metas(None);

    let instruction = Instruction {
        program_id: ctx.candy_machine_program,
        data: nft_instruction::SetCollectionDuringMint {}.data(),
        accounts,
    };

    Ok(Some((instruction, collection.mint)))
}

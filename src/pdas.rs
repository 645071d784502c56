use anchor_client::solana_sdk::pubkey::Pubkey;

use spl_associated_token_account::ID as ASSOCIATED_TOKEN_PROGRAM_ID;
use spl_token::ID as TOKEN_PROGRAM_ID;

pub fn get_ata_for_mint(mint: &Pubkey, wallet: &Pubkey) -> Pubkey {
    let seeds: &[&[u8]] = &[
        &wallet.to_bytes(),
        &TOKEN_PROGRAM_ID.to_bytes(),
        &mint.to_bytes(),
    ];
    let (pda, _bump) = Pubkey::find_program_address(seeds, &ASSOCIATED_TOKEN_PROGRAM_ID);
    pda
}

pub fn find_metadata_pda(mint: &Pubkey, token_metadata_program: &Pubkey) -> Pubkey {
    let metadata_seeds = &[
        "metadata".as_bytes(),
        &token_metadata_program.to_bytes(),
        &mint.to_bytes(),
    ];
    let (pda, _bump) = Pubkey::find_program_address(metadata_seeds, token_metadata_program);

    pda
}

pub fn find_master_edition_pda(mint: &Pubkey, token_metadata_program: &Pubkey) -> Pubkey {
    let master_edition_seeds = &[
        "metadata".as_bytes(),
        &token_metadata_program.to_bytes(),
        &mint.to_bytes(),
        "edition".as_bytes(),
    ];
    let (pda, _bump) = Pubkey::find_program_address(master_edition_seeds, token_metadata_program);

    pda
}

/// Returns the creator address and its nonce; the nonce is an argument of
/// the mint operation.
pub fn find_candy_machine_creator_pda(
    candy_machine_id: &Pubkey,
    candy_machine_program: &Pubkey,
) -> (Pubkey, u8) {
    let creator_seeds = &["candy_machine".as_bytes(), candy_machine_id.as_ref()];

    Pubkey::find_program_address(creator_seeds, candy_machine_program)
}

pub fn find_collection_pda(
    candy_machine_id: &Pubkey,
    candy_machine_program: &Pubkey,
) -> (Pubkey, u8) {
    let collection_seeds = &["collection".as_bytes(), candy_machine_id.as_ref()];

    Pubkey::find_program_address(collection_seeds, candy_machine_program)
}

pub fn find_collection_authority_record_pda(
    mint: &Pubkey,
    authority: &Pubkey,
    token_metadata_program: &Pubkey,
) -> Pubkey {
    let record_seeds = &[
        "metadata".as_bytes(),
        &token_metadata_program.to_bytes(),
        &mint.to_bytes(),
        "collection_authority".as_bytes(),
        &authority.to_bytes(),
    ];
    let (pda, _bump) = Pubkey::find_program_address(record_seeds, token_metadata_program);

    pda
}

pub fn find_network_token_pda(
    wallet: &Pubkey,
    gatekeeper_network: &Pubkey,
    gateway_program: &Pubkey,
) -> Pubkey {
    let seeds = &[
        &wallet.to_bytes(),
        "gateway".as_bytes(),
        &[0, 0, 0, 0, 0, 0, 0, 0],
        &gatekeeper_network.to_bytes(),
    ];
    let (pda, _bump) = Pubkey::find_program_address(seeds, gateway_program);

    pda
}

pub fn find_network_expire_pda(gatekeeper_network: &Pubkey, gateway_program: &Pubkey) -> Pubkey {
    let seeds = &[&gatekeeper_network.to_bytes(), "expire".as_bytes()];
    let (pda, _bump) = Pubkey::find_program_address(seeds, gateway_program);

    pda
}

use std::collections::HashSet;

use chrono::Utc;
use console::style;

use crate::candy_machine::{check_wallet, Machine};
use crate::common::*;
use crate::mint::builder::{build_mint_plans, CollectionLink, MintContext};
use crate::rpc::RpcError;
use crate::setup::candy_machine_id_from_options;
use crate::transactions::{send_bundles, TransactionBundle};
use crate::utils::*;

pub struct MintArgs {
    pub keypair: Option<String>,
    pub rpc_url: Option<String>,
    pub number: Option<u64>,
    pub candy_machine: Option<String>,
}

pub async fn process_mint(args: MintArgs) -> Result<()> {
    let config = praline_setup(args.keypair, args.rpc_url)?;
    let client = setup_rpc(&config);
    let candy_machine_id = candy_machine_id_from_options(args.candy_machine)?;

    println!(
        "{} {}Loading candy machine",
        style("[1/2]").bold().dim(),
        LOOKING_GLASS_EMOJI
    );
    println!("Candy machine ID: {}", &candy_machine_id);

    let pb = spinner_with_style();
    pb.set_message("Connecting...");

    let mut machine = Machine::fetch(&client, candy_machine_id).await?;
    let payer = config.keypair.pubkey();
    let standing = check_wallet(&client, &machine, &payer).await;

    pb.finish_with_message(format!("{} item(s) remaining", machine.items_remaining()));

    info!("Minting from candy machine: {}", &candy_machine_id);
    info!("Candy machine program id: {:?}", CANDY_MACHINE_PROGRAM_ID);

    let now = Utc::now().timestamp();

    if machine.is_sold_out() {
        let error = MintError::SoldOut;
        error!("{:?}", error);
        return Err(error.into());
    }

    if !(machine.is_live(now) || machine.is_presale(now) || machine.is_whitelist_only()) {
        let error = if machine.has_ended(now) {
            MintError::Ended
        } else {
            MintError::NotLive
        };
        error!("{:?}", error);
        return Err(error.into());
    }

    let number = args.number.unwrap_or(1);
    let available = machine.items_remaining();

    if number > available || number == 0 {
        let error = MintError::NotEnoughItems(available, number);
        error!("{:?}", error);
        return Err(error.into());
    }

    let max_available = machine.max_available(&standing);
    if number > max_available {
        println!(
            "{}Wallet only covers {} item(s) at the current price; trying anyway",
            WARNING_EMOJI, max_available
        );
    }

    println!(
        "\n{} {}Minting {} item(s)",
        style("[2/2]").bold().dim(),
        CANDY_EMOJI,
        number
    );

    let ctx = MintContext::new(candy_machine_id);
    let plans = build_mint_plans(&ctx, &client, &machine.state, &payer, number).await?;

    if plans
        .iter()
        .any(|plan| plan.collection == CollectionLink::Unavailable)
    {
        println!(
            "{}Collection record could not be read; minting without the collection link",
            WARNING_EMOJI
        );
    }

    let mut bundles: Vec<TransactionBundle> = Vec::new();
    let mut plan_ranges = Vec::new();
    for plan in plans {
        let mint = plan.mint;
        let start = bundles.len();
        bundles.extend(plan.into_bundles());
        plan_ranges.push((mint, start..bundles.len()));
    }

    let pb = progress_bar_with_style(bundles.len() as u64);
    let mut confirmed_indexes = HashSet::new();
    let mut failures: Vec<(usize, String)> = Vec::new();

    let signatures = send_bundles(
        &client,
        &config.keypair,
        bundles,
        |index, _transaction: &Transaction, result: Option<&Signature>| {
            if result.is_some() {
                confirmed_indexes.insert(index);
                pb.inc(1);
            }
        },
        |index, _transaction: &Transaction, err: &RpcError| {
            failures.push((index, err.to_string()));
            pb.inc(1);
        },
    )
    .await?;
    pb.finish();

    let minted_mints: Vec<Pubkey> = plan_ranges
        .iter()
        .filter(|(_, range)| range.clone().all(|index| confirmed_indexes.contains(&index)))
        .map(|(mint, _)| *mint)
        .collect();
    let minted = minted_mints.len() as u64;
    machine.record_redeemed(minted);

    for mint in &minted_mints {
        info!("Minted {}", mint);
    }
    for signature in &signatures {
        info!("Confirmed transaction: {}", signature);
    }

    if !failures.is_empty() {
        println!(
            "{}{} transaction(s) failed to confirm:",
            WARNING_EMOJI,
            failures.len()
        );
        for (index, message) in &failures {
            println!("  {} {}", style(format!("[{}]", index)).dim(), message);
        }
    }

    if minted == 0 {
        let error = anyhow!("No mints were confirmed");
        error!("{:?}", error);
        return Err(error);
    }

    if number == 1 {
        if let (Some(mint), Some(signature)) = (minted_mints.first(), signatures.last()) {
            println!("{} {}", style("Mint:").bold(), mint);
            println!("{} {}", style("Signature:").bold(), signature);
        }
    }

    println!(
        "\n{}Minted {} item(s), {} remaining",
        CONFETTI_EMOJI,
        minted,
        machine.items_remaining()
    );

    Ok(())
}

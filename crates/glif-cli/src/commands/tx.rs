//! `glif tx ...`

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context as _, Result};
use glif_primitives::{format_fil, format_nano_fil, parse_address, parse_fil, Hash, TxId, U256};
use glif_telemetry::log_tx_event;
use glif_tx::{
    ChainProvider, NonceCache, Percent, RbfPolicy, ReceiptWaiter, ReplaceKind, ReplaceOptions,
    Replacer, RpcChainProvider, TxRequest, TxSubmitter,
};

use crate::cli::{ReplaceArgs, TxCommand, WaitArgs};
use crate::context::Context;

pub async fn run(ctx: &Context, cmd: TxCommand) -> Result<()> {
    match cmd {
        TxCommand::Send {
            from,
            to,
            value,
            wait,
        } => {
            let to = parse_address(&to).with_context(|| format!("Invalid recipient '{to}'"))?;
            let value = parse_fil(&value).with_context(|| format!("Invalid amount '{value}'"))?;
            let signer = ctx.signer(&from)?;

            let provider = ctx.provider()?;
            ctx.check_network(provider.as_ref()).await?;

            let submitter = TxSubmitter::new(provider.clone(), Arc::new(NonceCache::new()));
            let signed = submitter
                .send(&signer, TxRequest::transfer(to, value))
                .await
                .context("Failed to send transaction")?;

            println!("{:?}", signed.hash);
            log_tx_event!(info, "Transfer broadcast", signed.hash, nonce = signed.tx.nonce);
            wait_for(provider, signed.hash, &wait).await
        }
        TxCommand::SpeedUp(args) => replace(ctx, ReplaceKind::SpeedUp, args).await,
        TxCommand::Cancel(args) => replace(ctx, ReplaceKind::Cancel, args).await,
        TxCommand::Wait { tx, wait } => {
            let provider = ctx.provider()?;
            let hash = resolve_hash(provider.as_ref(), &tx).await?;
            wait_for(provider, hash, &WaitArgs { no_wait: false, ..wait }).await
        }
    }
}

async fn replace(ctx: &Context, kind: ReplaceKind, args: ReplaceArgs) -> Result<()> {
    let tx_id = TxId::parse(&args.tx)
        .with_context(|| format!("Invalid transaction id '{}'", args.tx))?;

    let mut policy = RbfPolicy::new(Percent(args.ratio)).context("Invalid --ratio")?;
    if let Some(limit) = &args.max_fee {
        policy = policy.with_fee_limit(parse_atto(limit).context("Invalid --max-fee")?);
    }
    let opts = ReplaceOptions {
        max_priority_fee_per_gas: args
            .priority_fee
            .as_deref()
            .map(parse_atto)
            .transpose()
            .context("Invalid --priority-fee")?,
        max_fee_per_gas: None,
        gas_limit: args.gas_limit,
    };

    let signer = ctx.signer(&args.from)?;
    let provider = ctx.provider()?;
    ctx.check_network(provider.as_ref()).await?;

    let replacer = Replacer::new(provider.clone(), policy);
    let replacement = replacer
        .replace(&signer, &tx_id, kind, &opts)
        .await
        .with_context(|| format!("Failed to replace {tx_id}"))?;

    let fees = replacement.fees;
    println!("{:?}", replacement.signed.hash);
    println!(
        "priority fee {} -> {} nanoFIL, max fee {} -> {} nanoFIL",
        format_nano_fil(fees.old.max_priority_fee_per_gas),
        format_nano_fil(fees.new.max_priority_fee_per_gas),
        format_nano_fil(fees.old.max_fee_per_gas),
        format_nano_fil(fees.new.max_fee_per_gas),
    );
    wait_for(provider, replacement.signed.hash, &args.wait).await
}

/// A 0x hash, or a message CID looked up through Lotus.
async fn resolve_hash<P: ChainProvider>(provider: &P, input: &str) -> Result<Hash> {
    let tx_id = TxId::parse(input).with_context(|| format!("Invalid transaction id '{input}'"))?;
    match tx_id {
        TxId::EthHash(hash) => Ok(hash),
        TxId::Cid(cid) => provider
            .resolve_cid(&cid)
            .await
            .with_context(|| format!("Failed to resolve {cid}"))?
            .ok_or_else(|| anyhow!("No transaction found for {cid}")),
    }
}

async fn wait_for(provider: Arc<RpcChainProvider>, hash: Hash, args: &WaitArgs) -> Result<()> {
    if args.no_wait {
        return Ok(());
    }

    let receipt = ReceiptWaiter::new(provider)
        .with_confirmations(args.confirmations)
        .with_timeout(Duration::from_secs(args.timeout))
        .wait(hash)
        .await
        .with_context(|| format!("Transaction {hash:?} did not complete"))?;

    let fee = receipt
        .effective_gas_price
        .map(|price| price.saturating_mul(receipt.gas_used));
    match fee {
        Some(fee) => println!(
            "Included in block {} (fee {} FIL)",
            receipt.block_number,
            format_fil(fee)
        ),
        None => println!("Included in block {}", receipt.block_number),
    }
    Ok(())
}

/// Whole attoFIL amount in decimal.
fn parse_atto(input: &str) -> Result<U256> {
    let digits = input.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(anyhow!("'{input}' is not a whole number of attoFIL"));
    }
    U256::from_dec_str(digits).map_err(|e| anyhow!("'{input}' is out of range: {e:?}"))
}

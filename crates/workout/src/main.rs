//! Command-line front end for the wallet workflows.

use std::process::ExitCode;

use chain_eth::gateway::TransactionInfo;
use chain_eth::{chains, keys};
use chain_eth::units::{self, Unit};
use chain_eth::{Address, BlockRef, RpcGateway, TxHash};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use workout::{
    Config, ConfigArgs, GasSettings, Result, Submission, WorkoutError,
    DEFAULT_PRIORITY_FEE_WEI, RECEIPT_POLL_ATTEMPTS, RECEIPT_POLL_INTERVAL,
};

#[derive(Parser)]
#[command(name = "workout")]
#[command(about = "Generate keys, sign messages and send transactions on EVM networks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    config: ConfigArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Fee options shared by every command that sends a transaction.
#[derive(Args)]
struct GasArgs {
    /// Legacy gas price in gwei. Defaults to the node's eth_gasPrice.
    #[arg(long, conflicts_with = "eip1559")]
    gas_price_gwei: Option<String>,

    /// Send a type-2 (EIP-1559) transaction
    #[arg(long)]
    eip1559: bool,

    /// Fee cap in gwei. Defaults to twice the node's gas price plus the tip.
    #[arg(long, requires = "eip1559")]
    max_fee_gwei: Option<String>,

    /// Priority fee in gwei [default: 1]
    #[arg(long, requires = "eip1559")]
    priority_fee_gwei: Option<String>,

    /// Return after submission instead of waiting for the receipt
    #[arg(long)]
    no_wait: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new key pair
    Generate {
        /// Also print the private key. Anyone who sees it controls the funds.
        #[arg(long)]
        reveal: bool,
    },

    /// Show the public key and address of the configured private key
    PublicKey,

    /// Sign a message with the configured key and verify the signature
    SignMessage {
        message: String,
    },

    /// List the built-in networks
    Networks,

    /// Convert an amount between denominations (wei, gwei, ether, ...)
    Convert {
        amount: String,
        from: Unit,
        to: Unit,
    },

    /// Send native currency
    Transfer {
        to: Address,
        amount: String,

        #[arg(long, default_value_t = Unit::Ether)]
        unit: Unit,

        #[arg(long, default_value_t = workout::TRANSFER_GAS_LIMIT)]
        gas_limit: u64,

        #[command(flatten)]
        gas: GasArgs,
    },

    /// Transfer ERC-20 tokens
    Erc20Transfer {
        token: Address,
        to: Address,
        /// Amount in whole tokens
        amount: String,

        #[arg(long, default_value_t = 18)]
        decimals: u32,

        #[arg(long, default_value_t = TOKEN_GAS_LIMIT)]
        gas_limit: u64,

        #[command(flatten)]
        gas: GasArgs,
    },

    /// Allow a spender to move up to an amount of your ERC-20 tokens
    Erc20Approve {
        token: Address,
        spender: Address,
        /// Amount in whole tokens
        amount: String,

        #[arg(long, default_value_t = 18)]
        decimals: u32,

        #[arg(long, default_value_t = TOKEN_GAS_LIMIT)]
        gas_limit: u64,

        #[command(flatten)]
        gas: GasArgs,
    },

    /// Move ERC-20 tokens out of an account that approved you
    Erc20TransferFrom {
        token: Address,
        from: Address,
        to: Address,
        /// Amount in whole tokens
        amount: String,

        #[arg(long, default_value_t = 18)]
        decimals: u32,

        #[arg(long, default_value_t = TOKEN_GAS_LIMIT)]
        gas_limit: u64,

        #[command(flatten)]
        gas: GasArgs,
    },

    /// Query the amount a spender may still move for an owner
    Erc20Allowance {
        token: Address,
        spender: Address,
        /// Defaults to the configured key's address
        owner: Option<Address>,

        #[arg(long, default_value_t = 18)]
        decimals: u32,
    },

    /// Query an ERC-20 balance
    Erc20Balance {
        token: Address,
        /// Defaults to the configured key's address
        owner: Option<Address>,

        #[arg(long, default_value_t = 18)]
        decimals: u32,
    },

    /// Look up a transaction and its receipt by hash
    Tx {
        hash: TxHash,
    },

    /// Look up a transaction by block (hash, number, latest or pending) and index
    TxByBlock {
        block: BlockRef,
        index: u64,
    },
}

const TOKEN_GAS_LIMIT: u64 = 100_000;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate { reveal } => {
            let pair = keys::generate()?;
            println!("public key: {}", pair.public_key.to_hex());
            println!("address:    {}", pair.address.to_checksum());
            if reveal {
                eprintln!("warning: the private key below grants full control of this account");
                println!("private key: {}", pair.private_key.reveal_hex().as_str());
            }
        }

        Commands::PublicKey => {
            let config = Config::from_args(cli.config)?;
            let key = config.private_key()?;
            println!("public key: {}", key.public_key().to_hex());
            println!("address:    {}", key.address().to_checksum());
        }

        Commands::SignMessage { message } => {
            let config = Config::from_args(cli.config)?;
            let key = config.private_key()?;
            let proof = workout::sign_and_verify(message.as_bytes(), &key)?;
            println!("signature: {}", proof.signature.to_hex());
            println!("signer:    {}", proof.signer.to_checksum());
            println!("recovered: {}", proof.recovered.to_checksum());
            println!("verified:  {}", proof.verified());
        }

        Commands::Networks => {
            for chain in chains::supported_chains() {
                let kind = if chain.is_testnet { "testnet" } else { "mainnet" };
                println!(
                    "{:>9}  {:<18} {:<6} {kind}",
                    chain.chain_id, chain.name, chain.symbol
                );
            }
        }

        Commands::Convert { amount, from, to } => {
            println!("{} {to}", units::convert(&amount, from, to)?);
        }

        Commands::Transfer {
            to,
            amount,
            unit,
            gas_limit,
            gas,
        } => {
            let config = Config::from_args(cli.config)?;
            let key = config.private_key()?;
            let gateway = config.gateway()?;
            let value = units::to_base_unit(&amount, unit)?;
            let settings = gas_settings(&gas, gas_limit)?;

            let submission = workout::send_native_transfer(
                &gateway,
                &key,
                config.chain_id,
                &to,
                &value,
                &settings,
            )?;
            finish(&gateway, &config, &submission, &gas, 18)?;
        }

        Commands::Erc20Transfer {
            token,
            to,
            amount,
            decimals,
            gas_limit,
            gas,
        } => {
            let config = Config::from_args(cli.config)?;
            let key = config.private_key()?;
            let gateway = config.gateway()?;
            let amount = units::parse_units(&amount, decimals)?;
            let settings = gas_settings(&gas, gas_limit)?;

            let submission = workout::send_erc20_transfer(
                &gateway,
                &key,
                config.chain_id,
                &token,
                &to,
                &amount,
                &settings,
            )?;
            finish(&gateway, &config, &submission, &gas, decimals)?;
        }

        Commands::Erc20Approve {
            token,
            spender,
            amount,
            decimals,
            gas_limit,
            gas,
        } => {
            let config = Config::from_args(cli.config)?;
            let key = config.private_key()?;
            let gateway = config.gateway()?;
            let amount = units::parse_units(&amount, decimals)?;
            let settings = gas_settings(&gas, gas_limit)?;

            let submission = workout::send_erc20_approve(
                &gateway,
                &key,
                config.chain_id,
                &token,
                &spender,
                &amount,
                &settings,
            )?;
            finish(&gateway, &config, &submission, &gas, decimals)?;
        }

        Commands::Erc20TransferFrom {
            token,
            from,
            to,
            amount,
            decimals,
            gas_limit,
            gas,
        } => {
            let config = Config::from_args(cli.config)?;
            let key = config.private_key()?;
            let gateway = config.gateway()?;
            let amount = units::parse_units(&amount, decimals)?;
            let settings = gas_settings(&gas, gas_limit)?;

            let submission = workout::send_erc20_transfer_from(
                &gateway,
                &key,
                config.chain_id,
                &token,
                &from,
                &to,
                &amount,
                &settings,
            )?;
            finish(&gateway, &config, &submission, &gas, decimals)?;
        }

        Commands::Erc20Balance {
            token,
            owner,
            decimals,
        } => {
            let config = Config::from_args(cli.config)?;
            let owner = match owner {
                Some(owner) => owner,
                None => config.private_key()?.address(),
            };
            let gateway = config.gateway()?;
            let balance = workout::erc20_balance(&gateway, &token, &owner)?;
            println!("{}", units::format_units(&balance, decimals));
        }

        Commands::Erc20Allowance {
            token,
            spender,
            owner,
            decimals,
        } => {
            let config = Config::from_args(cli.config)?;
            let owner = match owner {
                Some(owner) => owner,
                None => config.private_key()?.address(),
            };
            let gateway = config.gateway()?;
            let allowance = workout::erc20_allowance(&gateway, &token, &owner, &spender)?;
            println!("{}", units::format_units(&allowance, decimals));
        }

        Commands::Tx { hash } => {
            let config = Config::from_args(cli.config)?;
            let gateway = config.gateway()?;
            let info = gateway
                .transaction_by_hash(&hash)?
                .ok_or_else(|| WorkoutError::NotFound(format!("transaction {hash}")))?;
            print_transaction(&info);
            match gateway.receipt(&hash)? {
                Some(receipt) => print_summary(&workout::summarize_receipt(&receipt), 18),
                None => println!("receipt:   none yet"),
            }
        }

        Commands::TxByBlock { block, index } => {
            let config = Config::from_args(cli.config)?;
            let gateway = config.gateway()?;
            let info = gateway
                .transaction_by_block(block, index)?
                .ok_or_else(|| WorkoutError::NotFound(format!("transaction {index} in {block}")))?;
            print_transaction(&info);
        }
    }
    Ok(())
}

fn gwei(amount: Option<&str>) -> Result<Option<num::BigUint>> {
    Ok(amount
        .map(|gwei| units::to_base_unit(gwei, Unit::Gwei))
        .transpose()?)
}

fn gas_settings(args: &GasArgs, gas_limit: u64) -> Result<GasSettings> {
    if !args.eip1559 {
        return Ok(GasSettings::legacy(
            gwei(args.gas_price_gwei.as_deref())?,
            gas_limit,
        ));
    }
    let priority_fee = gwei(args.priority_fee_gwei.as_deref())?
        .unwrap_or_else(|| DEFAULT_PRIORITY_FEE_WEI.into());
    Ok(GasSettings::eip1559(
        gwei(args.max_fee_gwei.as_deref())?,
        priority_fee,
        gas_limit,
    ))
}

/// Prints the hash and an explorer link, then waits for the receipt unless
/// `--no-wait` was given.
fn finish<G: RpcGateway>(
    gateway: &G,
    config: &Config,
    submission: &Submission,
    args: &GasArgs,
    decimals: u32,
) -> Result<()> {
    println!("transaction: {}", submission.hash);
    if let Some(chain) = chains::get_chain(config.chain_id) {
        println!("explorer:    {}/tx/{}", chain.explorer_url, submission.hash);
    }
    if args.no_wait {
        return Ok(());
    }
    let receipt = workout::wait_for_receipt(
        gateway,
        &submission.hash,
        RECEIPT_POLL_ATTEMPTS,
        RECEIPT_POLL_INTERVAL,
    )?;
    print_summary(&workout::summarize_receipt(&receipt), decimals);
    Ok(())
}

fn print_transaction(info: &TransactionInfo) {
    println!("hash:      {}", info.hash);
    println!("from:      {}", info.from.to_checksum());
    match &info.to {
        Some(to) => println!("to:        {}", to.to_checksum()),
        None => println!("to:        (contract creation)"),
    }
    println!("nonce:     {}", info.nonce);
    println!("value:     {} ether", units::from_base_unit(&info.value, Unit::Ether));
    if let Some(price) = &info.gas_price {
        println!("gas price: {} gwei", units::from_base_unit(price, Unit::Gwei));
    }
    println!("gas:       {}", info.gas);
    match (info.block_number, info.transaction_index) {
        (Some(number), Some(index)) => println!("block:     {number} (index {index})"),
        _ => println!("block:     pending"),
    }
}

fn print_summary(summary: &workout::ReceiptSummary, token_decimals: u32) {
    println!("status:    {}", if summary.success { "success" } else { "failed" });
    println!("block:     {}", summary.block_number);
    println!("gas used:  {}", summary.gas_used);
    if let Some(fee) = &summary.fee {
        println!("fee:       {} ether", units::from_base_unit(fee, Unit::Ether));
    }
    for event in &summary.transfers {
        println!(
            "transfer:  {} {} -> {} ({})",
            units::format_units(&event.amount, token_decimals),
            event.from.to_checksum(),
            event.to.to_checksum(),
            event.token.to_checksum()
        );
    }
}

mod config;
mod output;
mod request;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use tradedesk_calculator::plan;
use tradedesk_core::*;
use tradedesk_gateway::GraphQlGateway;
use tradedesk_risk::{SubmissionDecision, SubmissionGate};

use crate::config::{ConsoleConfig, Overrides};
use crate::request::LadderArgs;

#[derive(Parser)]
#[command(name = "tradedesk")]
#[command(about = "Bulk order calculator and MT5 trading console")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// TOML config file
    #[arg(short, long, env = "TRADEDESK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// GraphQL HTTP endpoint
    #[arg(long, env = "TRADEDESK_ENDPOINT", global = true)]
    endpoint: Option<String>,

    /// GraphQL WebSocket endpoint (derived from --endpoint when omitted)
    #[arg(long, global = true)]
    ws_endpoint: Option<String>,

    /// Bearer token
    #[arg(long, env = "TRADEDESK_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Session id sent as X-Session-Id
    #[arg(long, env = "TRADEDESK_SESSION_ID", global = true)]
    session_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate a bulk order ladder without sending it
    Calc {
        #[command(flatten)]
        ladder: LadderArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Calculate a bulk order ladder and submit it
    Submit {
        #[command(flatten)]
        ladder: LadderArgs,

        /// Confirm a plan that needs confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the terminal account
    Account,

    /// List open positions
    Positions,

    /// List working orders
    Orders,

    /// List closed trades
    History,

    /// Log the terminal into an MT5 account
    Connect {
        #[arg(long)]
        login: String,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = Mt5AccountInput::DEFAULT_SERVER)]
        server: String,

        /// Terminal installation path
        #[arg(long)]
        path: Option<String>,
    },

    /// Drop the terminal session
    Disconnect,

    /// Place a single order
    Order {
        #[arg(short, long)]
        symbol: String,

        /// BUY or SELL
        #[arg(long)]
        side: Side,

        #[arg(short, long)]
        volume: Decimal,

        #[arg(short, long)]
        price: Decimal,

        /// Stop loss
        #[arg(long)]
        sl: Option<Decimal>,

        /// Take profit
        #[arg(long)]
        tp: Option<Decimal>,

        #[arg(long)]
        magic: Option<i64>,
    },

    /// Close an open position
    Close {
        position_id: String,
    },

    /// Manage saved MT5 accounts
    Accounts {
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Print live updates until Ctrl-C
    Watch {
        #[arg(value_enum)]
        stream: StreamArg,
    },

    /// Check that the backend answers
    Ping,

    /// Sign in and print the issued access token
    Login {
        #[arg(long, env = "TRADEDESK_EMAIL")]
        email: String,

        #[arg(long, env = "TRADEDESK_PASSWORD", hide_env_values = true)]
        password: String,

        /// Write the tokens into the --config file instead of printing them
        #[arg(long)]
        save: bool,
    },

    /// Trade a refresh token for a new access token
    Refresh {
        /// Defaults to `[auth] refresh_token` from the config file
        #[arg(long)]
        refresh_token: Option<String>,

        /// Write the tokens into the --config file instead of printing them
        #[arg(long)]
        save: bool,
    },

    /// Show the user the bearer token belongs to
    Whoami,

    /// Inspect and administer users (admin only)
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users a page at a time
    List {
        #[arg(long, default_value = "20")]
        limit: u32,

        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Show one user
    Show {
        id: String,
    },

    /// Change a user's roles, status or names
    Update {
        id: String,

        /// Comma-separated roles, replacing the current set
        #[arg(long, value_delimiter = ',')]
        roles: Vec<UserRole>,

        /// active, inactive, suspended or pending_verification
        #[arg(long)]
        status: Option<UserStatus>,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        username: Option<String>,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// List saved accounts
    List,

    /// Store account credentials on the backend
    Save {
        #[arg(long)]
        login: i64,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = Mt5AccountInput::DEFAULT_SERVER)]
        server: String,

        #[arg(long)]
        path: Option<String>,
    },

    /// Change stored credentials
    Update {
        account_id: String,

        #[arg(long)]
        login: Option<i64>,

        #[arg(long)]
        password: Option<String>,

        #[arg(long)]
        server: Option<String>,

        #[arg(long)]
        path: Option<String>,
    },

    /// Remove a saved account
    Delete {
        account_id: String,
    },

    /// Connect the terminal using a saved account
    Connect {
        account_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StreamArg {
    Positions,
    Orders,
    Account,
}

impl From<StreamArg> for Mt5Stream {
    fn from(arg: StreamArg) -> Self {
        match arg {
            StreamArg::Positions => Mt5Stream::Positions,
            StreamArg::Orders => Mt5Stream::Orders,
            StreamArg::Account => Mt5Stream::Account,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = ConsoleConfig::load(cli.config.as_deref())?;
    config.apply(&Overrides {
        endpoint: cli.endpoint.clone(),
        ws_endpoint: cli.ws_endpoint.clone(),
        token: cli.token.clone(),
        session_id: cli.session_id.clone(),
    });

    // Calculation is offline; everything else needs the backend.
    if let Commands::Calc { ladder, json } = &cli.command {
        return run_calc(ladder, *json);
    }

    let gateway = GraphQlGateway::new(config.gateway.clone())?;

    match cli.command {
        Commands::Calc { .. } => {}
        Commands::Submit { ladder, yes } => {
            run_submit(&gateway, &config, &ladder, yes).await?;
        }
        Commands::Account => {
            let info = gateway.account_info().await?;
            output::print_account(&info);
        }
        Commands::Positions => {
            output::print_positions(&gateway.live_positions().await?);
        }
        Commands::Orders => {
            output::print_orders(&gateway.live_orders().await?);
        }
        Commands::History => {
            output::print_history(&gateway.trading_history().await?);
        }
        Commands::Connect {
            login,
            password,
            server,
            path,
        } => {
            let mut account = Mt5AccountInput::new(&login, &password);
            account.server = server;
            account.path = path;
            let connection = gateway.connect_account(account).await?;
            println!(
                "Connected {} on {}",
                connection.account_login, connection.server
            );
        }
        Commands::Disconnect => {
            if gateway.disconnect().await? {
                println!("Disconnected");
            } else {
                println!("No active terminal session");
            }
        }
        Commands::Order {
            symbol,
            side,
            volume,
            price,
            sl,
            tp,
            magic,
        } => {
            let mut order = PlaceOrderInput::new(&symbol, side, volume, price);
            order.sl = sl;
            order.tp = tp;
            order.magic = magic;
            let record = gateway.place_order(order).await?;
            println!(
                "Order {} {} {} {} @ {} ({})",
                record.id, record.kind, record.volume, record.symbol, record.price, record.status
            );
        }
        Commands::Close { position_id } => {
            println!("{}", gateway.close_position(&position_id).await?);
        }
        Commands::Accounts { command } => run_accounts(&gateway, command).await?,
        Commands::Watch { stream } => run_watch(&gateway, stream.into()).await?,
        Commands::Ping => {
            println!("{}", gateway.ping().await?);
        }
        Commands::Login {
            email,
            password,
            save,
        } => {
            let save_to = save_target(cli.config.as_deref(), save)?;
            let session = gateway.login(LoginInput { email, password }).await?;
            report_session(&session, save_to)?;
        }
        Commands::Refresh {
            refresh_token,
            save,
        } => {
            let save_to = save_target(cli.config.as_deref(), save)?;
            let session = run_refresh(&gateway, &config, refresh_token).await?;
            report_session(&session, save_to)?;
        }
        Commands::Whoami => {
            output::print_user(&gateway.me().await?);
        }
        Commands::Users { command } => run_users(&gateway, command).await?,
    }

    Ok(())
}

fn build_plan(ladder: &LadderArgs) -> Result<BulkOrderPlan> {
    let request = ladder.to_request()?;
    match plan(&request) {
        Ok(plan) => Ok(plan),
        Err(errors) => {
            for message in errors.messages() {
                eprintln!("  - {}", message);
            }
            bail!("Invalid bulk order: {}", errors);
        }
    }
}

fn run_calc(ladder: &LadderArgs, json: bool) -> Result<()> {
    let plan = build_plan(ladder)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        output::print_plan(&plan);
    }
    Ok(())
}

async fn run_submit(
    gateway: &dyn TradingGateway,
    config: &ConsoleConfig,
    ladder: &LadderArgs,
    confirmed: bool,
) -> Result<()> {
    let plan = build_plan(ladder)?;
    output::print_plan(&plan);

    let gate =
        SubmissionGate::new(config.risk.confirm_at).with_thresholds(config.risk.thresholds);
    match gate.evaluate(&plan.summary, confirmed) {
        SubmissionDecision::Approved => {}
        SubmissionDecision::ConfirmationRequired(reason) => {
            bail!("{}. Re-run with --yes to submit", reason);
        }
        SubmissionDecision::Rejected(reason) => bail!("{}", reason),
    }

    let message = match gateway.place_bulk_order(&plan.orders).await {
        Ok(message) => message,
        Err(err) => match err.code() {
            Some(code) => bail!("Bulk order submission failed [{}]: {}", code, err),
            None => bail!("Bulk order submission failed: {}", err),
        },
    };
    println!("{}", message);
    Ok(())
}

async fn run_accounts(gateway: &dyn TradingGateway, command: AccountCommands) -> Result<()> {
    let message = match command {
        AccountCommands::List => {
            output::print_saved_accounts(&gateway.saved_accounts().await?);
            return Ok(());
        }
        AccountCommands::Save {
            login,
            password,
            server,
            path,
        } => {
            gateway
                .save_account(SaveAccountInput {
                    login,
                    password,
                    server,
                    path,
                })
                .await?
        }
        AccountCommands::Update {
            account_id,
            login,
            password,
            server,
            path,
        } => {
            gateway
                .update_saved_account(UpdateAccountInput {
                    account_id,
                    login,
                    password,
                    server,
                    path,
                })
                .await?
        }
        AccountCommands::Delete { account_id } => {
            gateway.delete_saved_account(&account_id).await?
        }
        AccountCommands::Connect { account_id } => {
            gateway.connect_saved_account(&account_id).await?
        }
    };
    println!("{}", message);
    Ok(())
}

/// Config file that `--save` writes to.
fn save_target(config: Option<&Path>, save: bool) -> Result<Option<&Path>> {
    if !save {
        return Ok(None);
    }
    config
        .map(Some)
        .context("--save needs a config file (--config or TRADEDESK_CONFIG)")
}

fn report_session(session: &AuthSession, save_to: Option<&Path>) -> Result<()> {
    if let Some(user) = &session.user {
        println!("Signed in as {} ({})", user.email, user.id);
    }
    match save_to {
        Some(path) => {
            ConsoleConfig::store_session(
                path,
                &session.access_token,
                session.refresh_token.as_deref(),
            )?;
            println!("Tokens saved to {}", path.display());
        }
        None => {
            println!("Access token: {}", session.access_token);
            if let Some(refresh) = &session.refresh_token {
                println!("Refresh token: {}", refresh);
            }
        }
    }
    Ok(())
}

async fn run_refresh(
    gateway: &dyn TradingGateway,
    config: &ConsoleConfig,
    refresh_token: Option<String>,
) -> Result<AuthSession> {
    let Some(token) = refresh_token.or_else(|| config.auth.refresh_token.clone()) else {
        bail!("No refresh token: pass --refresh-token or sign in with `login --save`");
    };
    Ok(gateway.refresh_token(&token).await?)
}

async fn run_users(gateway: &dyn TradingGateway, command: UserCommands) -> Result<()> {
    match command {
        UserCommands::List { limit, offset } => {
            output::print_users(&gateway.users(limit, offset).await?);
        }
        UserCommands::Show { id } => match gateway.user(&id).await? {
            Some(user) => output::print_user(&user),
            None => bail!("No user with id {}", id),
        },
        UserCommands::Update {
            id,
            roles,
            status,
            display_name,
            username,
        } => {
            let input = AdminUpdateUserInput {
                username,
                display_name,
                roles: (!roles.is_empty()).then_some(roles),
                status,
            };
            if input.is_empty() {
                bail!("Nothing to update: pass --roles, --status, --display-name or --username");
            }
            let user = gateway.admin_update_user(&id, input).await?;
            output::print_user(&user);
        }
    }
    Ok(())
}

async fn run_watch(gateway: &dyn TradingGateway, stream: Mt5Stream) -> Result<()> {
    let mut events = gateway.subscribe(stream).await?;
    println!("Watching {} updates (Ctrl-C to stop)", stream);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => println!("{}", output::event_line(&event)),
                None => {
                    tracing::info!(%stream, "Stream ended");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

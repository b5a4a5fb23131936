//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod ask;
pub mod calc;

use std::error::Error;
use std::sync::LazyLock;

use clap::{Parser, Subcommand};

use crate::cli::ask::run_ask;
use crate::cli::calc::run_calc;
use crate::commands::topics_text;
use crate::core::config::defaults::CONFIG_KEYS;
use crate::core::config::Config;
use crate::ui::chat_loop::run_chat;

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{} ({})",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown")
    )
});

#[derive(Parser)]
#[command(name = "loanchat")]
#[command(version, long_version = LONG_VERSION.as_str())]
#[command(about = "Ask an AI assistant about loans and monthly payments")]
#[command(
    long_about = "Loanchat is a terminal chat assistant for loan payment questions. Replies come \
from Google's Gemini models and are typed out as they arrive.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your Gemini API key (GOOGLE_API_KEY is also accepted)\n\
  GEMINI_BASE_URL   Custom API base URL (optional)\n\
  LOANCHAT_LOG      Diagnostic log filter, e.g. 'debug' (written to stderr)\n\n\
Controls:\n\
  Enter             Send the message\n\
  Ctrl+C            Interrupt a reply; quit when idle\n\
  Ctrl+D            Quit\n\n\
Commands:\n\
  /help             Show all chat commands\n\
  /topic <n>        Ask about a predefined loan topic\n\
  /calc P R Y       Compute a monthly payment locally\n\
  /export [file]    Save the conversation (default loan_chat.txt)\n\
  /log <filename>   Enable logging to specified file\n\
  /log              Toggle logging pause/resume"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Gemini model to use (overrides the configured model)
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Enable logging to specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Ask a single question and print the reply
    Ask {
        /// The question to ask
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        prompt: Vec<String>,
    },
    /// Compute a fixed monthly payment
    Calc {
        /// Amount borrowed
        principal: f64,
        /// Annual interest rate in percent (e.g. 5 for 5%)
        rate: f64,
        /// Loan term in years
        years: f64,
        /// One-time processing fee, spread across all payments
        #[arg(long, default_value_t = 0.0)]
        fee: f64,
        /// Prepayment penalty, spread across all payments
        #[arg(long, default_value_t = 0.0)]
        penalty: f64,
    },
    /// List the predefined loan topics
    Topics,
    /// Set configuration values, or print them all when no value is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    crate::logging::init();
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(args.model, args.log).await,
        Commands::Ask { prompt } => run_ask(prompt, args.model, args.log).await,
        Commands::Calc {
            principal,
            rate,
            years,
            fee,
            penalty,
        } => run_calc(principal, rate, years, fee, penalty),
        Commands::Topics => {
            println!("{}", topics_text());
            println!();
            println!("Ask about one with: loanchat ask \"Tell me more about Home Loan.\"");
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let value = value.map(|parts| parts.join(" ")).unwrap_or_default();
            match key {
                Some(key) if !value.trim().is_empty() => {
                    if let Err(e) = config.set_value(&key, &value) {
                        eprintln!("❌ {e}");
                        std::process::exit(1);
                    }
                    config.save()?;
                    println!("✅ Set {key} to: {}", value.trim());
                }
                Some(key) if !CONFIG_KEYS.contains(&key.as_str()) => {
                    eprintln!("❌ Unknown config key: {key}");
                    eprintln!("Available keys: {}", CONFIG_KEYS.join(", "));
                    std::process::exit(1);
                }
                _ => config.print_all(),
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            if let Err(e) = config.unset_value(&key) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
    }
}

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use careerquiz::commands::{quiz, serve};
use careerquiz::config::{API_BASE_ENV, ClientConfig, load_dotenv};
use careerquiz::palette::Palette;
use careerquiz::quiz::QuizApi;
use careerquiz::{llm, utils};

#[derive(Parser, Debug)]
#[command(
    name = "careerquiz",
    version,
    about = "AI career-guidance quiz: relay server and terminal runner.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server that relays quiz requests to the language model
    Serve {
        /// Port to listen on. Overrides CAREERQUIZ_PORT.
        #[arg(long, value_name = "PORT")]
        port: Option<u16>,
        /// The single origin allowed by CORS. Overrides CAREERQUIZ_ORIGIN.
        #[arg(long, value_name = "URL")]
        origin: Option<String>,
    },
    /// Take the quiz in the terminal
    Quiz {
        /// Base URL of a running server. Overrides CAREERQUIZ_SERVER_ADDRESS.
        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },
    /// Manage the provider API key
    Llm {
        /// Store an API key in the local auth file. Prompts when no key is given.
        #[arg(
            long,
            value_name = "KEY",
            num_args = 0..=1,
            default_missing_value = "",
            conflicts_with = "clear"
        )]
        set: Option<String>,
        /// Remove the stored API key from the local auth file
        #[arg(long, conflicts_with = "test")]
        clear: bool,
        /// Verify the configured API key by calling the provider
        #[arg(long, conflicts_with = "clear")]
        test: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, origin } => serve::run(port, origin).await?,
        Command::Quiz { server } => {
            let address = server.unwrap_or_else(|| ClientConfig::from_env().server_address);
            quiz::run(QuizApi::new(address)).await?;
        }
        Command::Llm { set, clear, test } => handle_llm_command(set, clear, test).await?,
    }

    Ok(())
}

async fn handle_llm_command(set: Option<String>, clear: bool, test: bool) -> Result<()> {
    let store = llm::KeyStore::open()?;
    let api_base = std::env::var(API_BASE_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty());
    let endpoint = llm::endpoint_for(api_base.as_deref());
    let mut action_taken = false;

    if let Some(key) = set {
        let key = if key.trim().is_empty() {
            llm::prompt_for_api_key(&endpoint)?
        } else {
            key
        };
        if store.get(&endpoint)?.is_some()
            && !utils::ask_yn(format!(
                "An API key is already stored for {endpoint} and will be replaced."
            ))?
        {
            bail!("Kept the existing API key.");
        }
        store.set(&endpoint, &key)?;
        println!(
            "{} {}",
            Palette::paint(Palette::SUCCESS, "Stored API key for"),
            endpoint
        );
        action_taken = true;
    }

    if clear {
        if store.remove(&endpoint)? {
            println!("Removed the stored API key for {endpoint}.");
        } else {
            println!("No API key stored for {endpoint}.");
        }
        action_taken = true;
    }

    if test {
        let source = llm::test_configured_api_key(&store, api_base.as_deref()).await?;
        println!(
            "API key from the {} is {}.",
            source.description(),
            Palette::paint(Palette::SUCCESS, "valid")
        );
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --set, --clear, or --test.");
    }

    Ok(())
}

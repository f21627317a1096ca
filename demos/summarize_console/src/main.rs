mod session;
mod slider;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::Parser;
use session::{Command, Session, parse_command, run_summary};
use summarize::clients::Client;
use summarize::config::{DEFAULT_BASE_URL, DEFAULT_MODEL, HF_TOKEN_ENV_VAR};
use summarize::summarization::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};
use summarize::{ConfigBuilder, Error, ErrorKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "summarize_console")]
#[command(about = "Paste a long text and get a concise summary back")]
struct Args {
    /// Maximum summary length (50..=500, step 10)
    #[arg(long, default_value_t = DEFAULT_MAX_LENGTH)]
    max_length: u32,

    /// Minimum summary length (10..=200, step 10)
    #[arg(long, default_value_t = DEFAULT_MIN_LENGTH)]
    min_length: u32,

    /// Hugging Face access token
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "HF_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, env = "HF_INFERENCE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Abort a request after this many seconds. No limit by default.
    #[arg(long, env = "HF_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Summarize this text once and exit instead of starting the interactive prompt
    #[arg(long)]
    text: Option<String>,
}

fn build_client(args: &Args) -> summarize::Result<Box<dyn Client>> {
    let api_key = args
        .api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| Error::MissingCredential(HF_TOKEN_ENV_VAR.to_string()))?;

    let mut config = ConfigBuilder::default();
    config
        .api_key(api_key)
        .model(args.model.as_str())
        .base_url(summarize::utils::uri::ensure_no_trailing_slash(
            args.base_url.as_str(),
        ));
    if let Some(secs) = args.timeout_secs {
        config.timeout(Duration::from_secs(secs));
    }
    let config = config.build()?;

    let client = summarize::clients::huggingface::Client::from_config(&config)?;
    info!(model = client.model(), endpoint = %client.endpoint(), "client ready");
    Ok(Box::new(client))
}

/// Reads lines until an empty line or EOF. Returns `None` on EOF with nothing read.
fn read_block(stdin: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut block = String::new();
    loop {
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            return Ok(if block.is_empty() { None } else { Some(block) });
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            if block.is_empty() {
                continue;
            }
            return Ok(Some(block));
        }
        if block.is_empty() && parse_command(line).is_some() {
            return Ok(Some(line.to_string()));
        }
        if !block.is_empty() {
            block.push('\n');
        }
        block.push_str(line);
    }
}

async fn summarize_with_interrupt(
    client: &dyn Client,
    session: &Session,
    text: &str,
) -> summarize::Result<String> {
    let cancel_token = CancellationToken::new();

    let interrupt = tokio::spawn({
        let cancel_token = cancel_token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel_token.cancel();
            }
        }
    });

    let result = run_summary(client, session, text, Some(cancel_token)).await;
    interrupt.abort();
    result
}

fn report(err: &Error) {
    eprintln!("Error ({}): {}", err.kind(), err);
    match err.kind() {
        ErrorKind::Transport => eprintln!("The request can be retried."),
        ErrorKind::ResponseFormat => {
            eprintln!("The service answered in an unexpected format.")
        }
        ErrorKind::Configuration | ErrorKind::Cancelled => {}
    }
}

fn print_help() {
    println!("Paste text and finish with an empty line to summarize it.");
    println!("  /max N   set the maximum summary length");
    println!("  /min N   set the minimum summary length");
    println!("  /show    show current settings");
    println!("  exit     quit (Ctrl-D works too)");
    println!("Ctrl-C while waiting cancels the running summarization.");
}

#[tokio::main]
async fn main() -> summarize::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let client = build_client(&args)?;

    let mut session = match Session::new(args.max_length, args.min_length) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    if let Some(text) = &args.text {
        let summary = run_summary(&*client, &session, text, None).await?;
        println!("{summary}");
        return Ok(());
    }

    println!("# Text Summarization Tool");
    println!("Enter a long document or article below, and get a concise summary instantly!");
    print_help();
    println!();
    println!("{}", session.describe());

    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    loop {
        print!("\n> ");
        io::stdout().flush()?;

        let Some(block) = read_block(&mut stdin)? else {
            println!("Goodbye!");
            break;
        };

        if let Some(command) = parse_command(&block) {
            match command.and_then(|command| session.apply(&command).map(|go_on| (command, go_on)))
            {
                Ok((_, false)) => {
                    println!("Goodbye!");
                    break;
                }
                Ok((Command::Help, _)) => print_help(),
                Ok(_) => println!("{}", session.describe()),
                Err(e) => eprintln!("{e}"),
            }
            continue;
        }

        debug!(chars = block.chars().count(), "summarizing input");
        match summarize_with_interrupt(&*client, &session, &block).await {
            Ok(summary) => println!("\nSummary:\n{summary}"),
            Err(e) => report(&e),
        }
    }

    Ok(())
}

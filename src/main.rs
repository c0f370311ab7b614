use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use kardec_chat::{
    CompletionClient, Conversation, MockCompletion, OpenAiClient, SendMessageUseCase, SendOutcome,
};

#[derive(Parser)]
#[command(name = "kardec-chat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model identifier sent with every request
    #[arg(long, global = true)]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Sampling temperature sent with every request
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Use the offline mock client instead of the remote endpoint
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,

    /// Send a single question and print the reply
    Ask { question: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat);

    let interactive = matches!(command, Commands::Chat);
    let level = if cli.verbose {
        Level::DEBUG
    } else if interactive {
        // Keep the alternate screen free of log noise.
        Level::WARN
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (completion, model_label): (Arc<dyn CompletionClient>, String) = if cli.mock {
        info!("Using mock completion client");
        (Arc::new(MockCompletion::new()), "mock".to_string())
    } else {
        let Some(mut client) = OpenAiClient::from_env() else {
            anyhow::bail!(
                "OPENAI_API_KEY is not set. Export it to talk to the remote \
                 assistant, or run with --mock for the offline client."
            );
        };
        if let Some(model) = cli.model {
            client = client.with_model(model);
        }
        if let Some(base_url) = cli.base_url {
            client = client.with_base_url(base_url);
        }
        if let Some(temperature) = cli.temperature {
            client = client.with_temperature(temperature);
        }
        let label = client.model().to_string();
        (Arc::new(client), label)
    };

    let use_case = Arc::new(SendMessageUseCase::new(completion));

    match command {
        Commands::Chat => kardec_chat::tui::run(use_case, model_label).await?,

        Commands::Ask { question } => {
            let mut conversation = Conversation::new();
            match use_case.execute(&mut conversation, &question).await {
                SendOutcome::Ignored => {
                    eprintln!("Nada a enviar: a pergunta está vazia.");
                }
                SendOutcome::Replied | SendOutcome::Failed => {
                    if let Some(reply) = conversation.last() {
                        println!("{}", reply.text());
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn defaults_to_chat_when_no_subcommand_is_given() {
        let cli = Cli::try_parse_from(["kardec-chat", "--mock"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.mock);
    }

    #[test]
    fn ask_takes_a_question() {
        let cli = Cli::try_parse_from(["kardec-chat", "ask", "O que é a alma?"]).unwrap();
        match cli.command {
            Some(Commands::Ask { question }) => assert_eq!(question, "O que é a alma?"),
            _ => panic!("expected ask subcommand"),
        }
    }

    #[test]
    fn global_flags_apply_to_subcommands() {
        let cli = Cli::try_parse_from(["kardec-chat", "ask", "oi", "--model", "gpt-4o"]).unwrap();
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
    }
}

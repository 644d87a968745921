use anyhow::Result;
use clap::Parser;
use console::style;
use dotenv::dotenv;
use futures::StreamExt;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use toolchat::chat::{Chat, LoopConfig};
use toolchat::models::tool::Arguments;
use toolchat::observer::TracingObserver;
use toolchat::providers::anthropic::{AnthropicProvider, ANTHROPIC_DEFAULT_MODEL};

mod orders;
mod tools;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model to use
    #[arg(short, long, default_value = ANTHROPIC_DEFAULT_MODEL)]
    model: String,

    /// Maximum tool execution rounds per request
    #[arg(long, default_value_t = 10)]
    max_steps: usize,

    /// Output token budget per model call
    #[arg(long, default_value_t = 4096)]
    max_tokens: i32,

    /// Disable request/response/tool logging
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let provider = AnthropicProvider::from_env()?;
    let mut chat =
        Chat::new(Box::new(provider), cli.model.clone()).with_max_tokens(cli.max_tokens);
    if !cli.quiet {
        chat = chat.with_observer(Box::new(TracingObserver));
    }
    tools::register_all(&mut chat)?;

    println!(
        "{}",
        style("toolchat — ask about orders, customers, weather, or math").bold()
    );
    println!("{}", style("type 'exit' to quit").dim());

    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }
        let _ = editor.add_history_entry(input);

        let mut stream = chat.tool_loop(input, LoopConfig::new().max_steps(cli.max_steps));
        while let Some(reply) = stream.next().await {
            match reply {
                Ok(reply) => {
                    for request in reply.tool_requests() {
                        println!(
                            "{} {}({})",
                            style("tool:").cyan(),
                            request.call.name,
                            render_arguments(&request.call.arguments)
                        );
                    }
                    let text = reply.text();
                    if !text.is_empty() {
                        println!("{}", text);
                    }
                }
                Err(e) => {
                    eprintln!("{} {}", style("error:").red(), e);
                    break;
                }
            }
        }
    }

    Ok(())
}

fn render_arguments(arguments: &Arguments) -> String {
    arguments
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}

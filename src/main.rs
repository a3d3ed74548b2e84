use clap::Parser;
use colored::*;
use std::io::Write;
use std::process;
use tokio::io::{AsyncBufReadExt, BufReader};

use argochat::chat::ChatClient;
use argochat::cli::ChatArgs;
use argochat::config::ClientConfig;
use argochat::error::ArgoChatError;
use argochat::logging;
use argochat::ui::{display_error, display_tools, render_messages, CodeHighlighter};

#[tokio::main]
async fn main() {
    let args = ChatArgs::parse();
    logging::init(false);

    if let Err(e) = run(args).await {
        display_error(&format!("{:#}", e));
        process::exit(1);
    }
}

async fn run(args: ChatArgs) -> anyhow::Result<()> {
    let config = ClientConfig::from_env_and_args(&args)?;
    let mut client = ChatClient::new(&config)?;
    let highlighter = CodeHighlighter::new();

    if args.list_tools {
        display_tools(&client.tools().await?);
        return Ok(());
    }

    if !args.question.is_empty() {
        ask(&mut client, &highlighter, &args.question.join(" ")).await?;
        return Ok(());
    }

    interactive(&mut client, &highlighter).await
}

async fn ask(
    client: &mut ChatClient,
    highlighter: &CodeHighlighter,
    question: &str,
) -> Result<(), ArgoChatError> {
    let before = client.history().len();
    let response = client.query(question).await?;
    let start = before.min(response.messages.len());
    render_messages(&response.messages[start..], highlighter, false);
    Ok(())
}

async fn interactive(client: &mut ChatClient, highlighter: &CodeHighlighter) -> anyhow::Result<()> {
    println!(
        "{}",
        "Ask about ARGO float data. /tools lists tools, /new starts over, /quit exits.".dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/new" => {
                client.end_session().await?;
                println!("{}", "Started a new conversation.".green());
            }
            "/tools" => match client.tools().await {
                Ok(tools) => display_tools(&tools),
                Err(e) => display_error(&e.to_string()),
            },
            question => {
                if let Err(e) = ask(client, highlighter, question).await {
                    display_error(&e.to_string());
                }
            }
        }
    }

    if let Err(e) = client.end_session().await {
        tracing::debug!(error = %e, "could not end session");
    }
    Ok(())
}

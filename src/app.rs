use crate::api::ChatClient;
use crate::config::Config;
use crate::state::{ConversationManager, ConversationStreamUpdate};
use anyhow::Result;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Line-oriented front end over the streaming core. Everything here is a
/// stateless consumer of the update sink; the conversation state machine
/// lives in `state::conversation`.
pub struct App {
    manager: ConversationManager,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let client = ChatClient::new(&config);
        Ok(Self {
            manager: ConversationManager::new(client),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("dashchat: streaming assistant client");
        println!("commands: /models  /health  /quit");

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            print!("you> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match line.trim() {
                "" => continue,
                "/quit" | "/exit" => break,
                "/models" => self.print_models().await,
                "/health" => self.print_health().await,
                input => self.run_turn(input).await,
            }
        }

        Ok(())
    }

    async fn run_turn(&mut self, input: &str) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                match update {
                    ConversationStreamUpdate::Status { text, .. } => {
                        println!("· {text}");
                    }
                    ConversationStreamUpdate::Delta { text, .. } => {
                        print!("{text}");
                        let _ = std::io::stdout().flush();
                    }
                    ConversationStreamUpdate::Resolved { .. } => {
                        println!();
                    }
                    ConversationStreamUpdate::Failed { message, .. } => {
                        println!("! {message}");
                    }
                }
            }
        });

        let result = self.manager.send_message(input, Some(&tx)).await;
        drop(tx);
        let _ = printer.await;

        if let Err(error) = result {
            eprintln!("turn failed: {error:#}");
        }
    }

    async fn print_models(&self) {
        match self.manager.client().list_models().await {
            Ok(response) => {
                for model in &response.models {
                    let functions = if model.supports_functions {
                        "tools"
                    } else {
                        "text-only"
                    };
                    let default_marker = if response.default.as_deref() == Some(model.id.as_str())
                    {
                        " (default)"
                    } else {
                        ""
                    };
                    println!("{}  {}  [{}]{}", model.id, model.name, functions, default_marker);
                }
            }
            Err(error) => eprintln!("could not list models: {error:#}"),
        }
    }

    async fn print_health(&self) {
        match self.manager.client().health().await {
            Ok(health) => println!(
                "bridge status: {} (connected: {})",
                health.status, health.connected
            ),
            Err(error) => eprintln!("bridge unreachable: {error:#}"),
        }
    }
}

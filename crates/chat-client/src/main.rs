//! Thin console client for the chat server.
//!
//! Connects, prints every line the server sends, and forwards each
//! stdin line verbatim. All protocol knowledge stays on the server;
//! this is just a line pipe with a quit command.

use std::env;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> Result<()> {
    // Where to connect: env override or default.
    let addr = env::var("CHAT_SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8580".to_string());

    println!("Connecting to {}...", addr);
    let stream = TcpStream::connect(&addr).await?;
    println!("Connected.");
    println!("Commands:");
    println!("  NICK <name>       choose a nickname (asked for on connect)");
    println!("  COMMAND:JOIN:<n>  join room <n>");
    println!("  COMMAND:LEAVE     return to the lobby");
    println!("Anything else is sent to your current room.");
    println!("Type 'quit' or 'exit' to leave.\n");

    let (read_half, mut write_half) = stream.into_split();

    // Print incoming lines until the server goes away.
    let printer = tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => println!("{}", line),
                Ok(None) => {
                    println!("Server closed the connection.");
                    break;
                }
                Err(e) => {
                    eprintln!("Read error: {:?}", e);
                    break;
                }
            }
        }
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = stdin.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            println!("Exiting client.");
            break;
        }

        if let Err(e) = write_half.write_all(format!("{}\n", trimmed).as_bytes()).await {
            eprintln!("Send failed: {:?}", e);
            break;
        }
    }

    drop(write_half);
    printer.abort();
    Ok(())
}

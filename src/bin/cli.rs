//! framewire CLI Client
//!
//! Command-line interface for talking to a framewire server. Runs a single
//! command when one is given, otherwise starts an interactive prompt.

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use framewire::config::DEFAULT_ADDR;
use framewire::{Client, Command, FramewireError};
use tracing_subscriber::{fmt, EnvFilter};

/// framewire CLI
#[derive(Parser, Debug)]
#[command(name = "framewire-cli")]
#[command(about = "CLI for a framewire server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = DEFAULT_ADDR)]
    server: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Have the server send a message back
    Echo {
        /// The message to echo
        message: Vec<String>,
    },

    /// Have the server reverse a message
    Rev {
        /// The message to reverse
        message: Vec<String>,
    },

    /// Disconnect from the server
    Quit,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Connection to {} failed: {}. Is the server running?", args.server, e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Connected to {}", client.peer_addr());

    let result = match args.command {
        Some(Commands::Echo { message }) => print_response(client.echo(&message.join(" "))),
        Some(Commands::Rev { message }) => print_response(client.reverse(&message.join(" "))),
        Some(Commands::Quit) => client.quit(),
        None => interactive(&mut client),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_response(response: framewire::Result<String>) -> framewire::Result<()> {
    println!("Server Response: {}", response?);
    Ok(())
}

/// Line-oriented prompt: `echo <message>`, `rev <message>`, `quit`
fn interactive(client: &mut Client) -> framewire::Result<()> {
    println!("\nCommands:");
    println!("  echo <message>  - Server will send the message back.");
    println!("  rev <message>   - Server will reverse the message.");
    println!("  quit            - Disconnect from the server.");
    println!("--------------------------------------------------");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("Enter command > ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            // stdin closed: leave politely
            None => return client.quit(),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (word, payload) = line.split_once(' ').unwrap_or((line, ""));
        let Some(command) = Command::from_name(word) else {
            println!("Invalid command. Please use 'echo', 'rev', or 'quit'.");
            continue;
        };

        if command == Command::Quit {
            client.quit()?;
            println!("Sent QUIT command to server.");
            return Ok(());
        }

        match client.request(command, payload.to_owned()) {
            Ok(response) => println!("Server Response: {}", response.payload_text()),
            Err(e @ FramewireError::UnexpectedResponse(_)) | Err(e @ FramewireError::Io(_)) => {
                println!("Did not receive a valid response from the server.");
                return Err(e);
            }
            Err(e) => return Err(e),
        }
    }
}

//! remotelist CLI Client
//!
//! Command-line interface for interacting with a remotelist server.

use clap::{Parser, Subcommand};
use remotelist::network::Client;

/// remotelist CLI
#[derive(Parser, Debug)]
#[command(name = "remotelist-cli")]
#[command(about = "CLI for the remotelist store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a value to a list (creates the list)
    Append {
        /// The list id
        list: String,

        /// The value to append
        #[arg(allow_hyphen_values = true)]
        value: i64,
    },

    /// Get the value at an index
    Get {
        /// The list id
        list: String,

        /// Zero-based index
        #[arg(allow_hyphen_values = true)]
        index: i32,
    },

    /// Remove and print the last value of a list
    Remove {
        /// The list id
        list: String,
    },

    /// Print the number of values in a list
    Size {
        /// The list id
        list: String,
    },

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Cannot connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Commands::Append { list, value } => client
            .append(&list, value)
            .map(|reply| format!("success: {}", reply.success)),
        Commands::Get { list, index } => client.get(&list, index).map(|r| r.value.to_string()),
        Commands::Remove { list } => client.remove(&list).map(|r| r.value.to_string()),
        Commands::Size { list } => client.size(&list).map(|r| r.size.to_string()),
        Commands::Ping => client.ping().map(|_| "PONG".to_string()),
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

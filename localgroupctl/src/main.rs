// ABOUTME: provides an operator cli for inspecting and fixing local group membership once.
// ABOUTME: prints deterministic json for every command.

use clap::{Parser, Subcommand};
use localgroup_common::platform::LocalDirectory;
use localgroup_common::Target;

#[derive(Debug, Parser)]
#[command(name = "localgroupctl")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Whoami,
    Members {
        group: String,
    },
    Check {
        account: String,
        group: String,
    },
    Ensure {
        account: String,
        group: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let directory = LocalDirectory::default();

    let json = match args.command {
        Command::Whoami => serde_json::to_string_pretty(&localgroupctl::whoami(&directory)?)?,
        Command::Members { group } => serde_json::to_string_pretty(&localgroupctl::members(&directory, &group)?)?,
        Command::Check { account, group } => {
            serde_json::to_string_pretty(&localgroupctl::check(&directory, &Target::new(account, group))?)?
        }
        Command::Ensure { account, group } => {
            serde_json::to_string_pretty(&localgroupctl::ensure(&directory, &Target::new(account, group))?)?
        }
    };
    println!("{json}");

    Ok(())
}

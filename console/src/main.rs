mod list;
mod scan;
pub mod utils;

use clap::{
    Parser,
    Subcommand,
};
use list::ListArgs;
use scan::ScanArgs;
use utils::UtilsArgs;
use wild::ArgsOs;

#[derive(Parser, Debug)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,)]
struct Cli {
    #[command(subcommand)]
    command: MainMenu,
}

#[derive(Subcommand, Debug)]
enum MainMenu {
    /// Scan submissions and print a discrepancy report.
    Scan {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  ScanArgs,
    },

    /// List the known rules.
    List {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  ListArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let args: ArgsOs = wild::args_os();
    let cli = Cli::parse_from(args);

    match cli.command {
        MainMenu::Scan { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::List { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
    }
    Ok(())
}

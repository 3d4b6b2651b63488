pub mod httpxjson;
pub mod nuclei;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use nuclei::NucleiArgs;

const LONG_ABOUT: &str = "vulntechx finds vulnerabilities based on tech stack using nuclei tags or template conditions.

Examples:
  # Step 1, subdomain enumeration, probing and tech detection
  subfinder -d hackerone.com -all -silent | httpx -silent -nc -mc 200 -td | tee httpx.txt

  # Step 2, convert httpx output to json
  cat httpx.txt | vulntechx httpxjson -o httpxjson-output.json

  # Step 3, scan every host with templates matching its tech
  vulntechx nuclei --file httpxjson-output.json --cmd \"nuclei -duc -nc -t ~/nuclei-templates -tags {tech} -es unknown,info,low\" --parallel 10 --process --append-output nuclei-output.txt";

#[derive(Parser)]
#[command(name = "vulntechx")]
#[command(about = "Find vulnerabilities based on tech stack using nuclei.")]
#[command(long_about = LONG_ABOUT)]
#[command(disable_version_flag = true)]
pub struct CommandLine {
    /// Print the version of the tool and exit
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Do not print the banner
    #[arg(long)]
    pub no_banner: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run scans on many hosts in parallel, filtered by technology stack
    #[command(alias = "n")]
    Nuclei(NucleiArgs),
    /// Convert httpx tech-detect output read from stdin into JSON records
    Httpxjson {
        /// File to save JSON results to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn verbose(&self) -> bool {
        matches!(&self.command, Some(Commands::Nuclei(args)) if args.verbose)
    }

    pub fn print_help() -> anyhow::Result<()> {
        Self::command().print_help()?;
        Ok(())
    }
}

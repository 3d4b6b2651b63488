mod commands;
mod terminal;

use commands::{CommandLine, Commands, httpxjson, nuclei};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose());
    print::banner(commands.no_banner);

    if commands.version {
        print::version();
        return Ok(());
    }

    match commands.command {
        Some(Commands::Nuclei(args)) => {
            print::header("starting scans");
            nuclei::nuclei(args).await
        }
        Some(Commands::Httpxjson { output }) => httpxjson::httpxjson(output),
        None => CommandLine::print_help(),
    }
}

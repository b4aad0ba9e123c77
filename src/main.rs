use clap::Parser;
use etsi_qkd_014_client::cli::{self, CliArgs};

fn main() {
    let args = CliArgs::parse();
    simple_logger::SimpleLogger::new()
        .with_level(args.log_level())
        .init()
        .unwrap_or_else(|e| eprintln!("Cannot initialize logger: {}", e));

    let exit_code = cli::run(&args, &mut std::io::stdout());
    std::process::exit(exit_code);
}

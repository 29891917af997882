use clap::Parser;
use switchyard::cli::{
    handle_completions, handle_config_init, providers, status, Cli, Commands, ConfigCommands,
};
use switchyard::config::SwitchyardConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => switchyard::cli::serve::run_serve(args).await,
        Commands::Providers(args) => match SwitchyardConfig::load(Some(args.config.as_path())) {
            Ok(config) => {
                providers::handle_providers(&args, &config).map(|output| println!("{}", output))
            }
            Err(e) => Err(e.into()),
        },
        Commands::Status(args) => status::handle_status(&args)
            .await
            .map(|output| println!("{}", output)),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

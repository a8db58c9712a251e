use clap::Parser;
use poly_trade::cli::{self, Cli, Commands};
use poly_trade::PolymarketClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = cli.client_config()?;
    poly_trade::telemetry::init_telemetry(&config)?;

    if let Commands::Config(args) = &cli.command {
        return args.execute(&config);
    }
    if let Commands::Size(args) = &cli.command {
        return args.execute();
    }

    let mut client = PolymarketClient::connect(config).await?;

    match cli.command {
        Commands::Markets(args) => args.execute(&mut client).await?,
        Commands::Search(args) => args.execute(&mut client).await?,
        Commands::Market(args) => args.execute(&client).await?,
        Commands::Book(args) => args.execute(&client).await?,
        Commands::Price(args) => args.execute(&client).await?,
        Commands::Order(args) => {
            if !client.config().dry_run() {
                tracing::warn!("Live mode: orders will be submitted to the CLOB");
            }
            args.execute(&client).await?
        }
        Commands::Cancel(args) => args.execute(&client).await?,
        Commands::Orders(args) => args.execute(&client).await?,
        Commands::Balance(args) => args.execute(&client).await?,
        Commands::Health => cli::health(&client).await?,
        Commands::Cleanup(args) => args.execute(&client)?,
        Commands::Demo(args) => args.execute(&mut client).await?,
        Commands::Config(_) | Commands::Size(_) => {}
    }

    Ok(())
}

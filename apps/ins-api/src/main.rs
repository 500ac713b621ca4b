use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = ins_api::Args::parse();

	ins_api::run(args).await
}

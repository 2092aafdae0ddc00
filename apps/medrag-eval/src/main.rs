// crates.io
use clap::Parser;
// self
use medrag_eval::Args;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	medrag_eval::run(args)
}

use clap::Args;

use crate::error::Result;
use crate::utils::read_input;

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the PEM file. If not specified, reads from stdin
    pub(crate) file: Option<String>,

    /// Output a single JWK; the input must hold exactly one PEM block
    #[arg(short = '1', long)]
    pub(crate) singleton: bool,

    /// Output private keys; without this, private keys yield their public part
    #[arg(short, long)]
    pub(crate) private: bool,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let input = read_input(config.file.as_deref())?;
    let json = if config.singleton {
        jwk::pem_to_jwk(&input, config.private)?
    } else {
        jwk::pem_to_jwks(&input, config.private)?
    };
    println!("{json}");
    Ok(())
}

use clap::Args;

use crate::error::Result;
use crate::utils::read_input;

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the JWKS file. If not specified, reads from stdin
    pub(crate) file: Option<String>,

    /// Read a single JWK instead of a JWKS
    #[arg(short = '1', long)]
    pub(crate) singleton: bool,

    /// Output PRIVATE KEY blocks; without this, PUBLIC KEY blocks are written
    #[arg(short, long)]
    pub(crate) private: bool,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let input = read_input(config.file.as_deref())?;
    let pem = if config.singleton {
        jwk::jwk_to_pem(&input, config.private)?
    } else {
        jwk::jwks_to_pem(&input, config.private)?
    };
    print!("{pem}");
    Ok(())
}

use clap::Parser;

use crate::Scope;

/// Unpause the containers of the node and restart the node agent
#[derive(Parser, Debug)]
pub struct Unpause {
    #[clap(flatten)]
    pub scope: Scope,
}

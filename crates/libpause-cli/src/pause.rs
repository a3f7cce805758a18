use clap::Parser;

use crate::Scope;

/// Pause the containers of the node and keep the node agent from restarting them
#[derive(Parser, Debug)]
pub struct Pause {
    #[clap(flatten)]
    pub scope: Scope,
}

use clap::Parser;

use crate::Scope;

/// Show the node agent state and the running and paused containers
#[derive(Parser, Debug)]
pub struct Status {
    #[clap(flatten)]
    pub scope: Scope,
}

use clap::Parser;

pub const DEFAULT_NAMESPACES: &str =
    "kube-system,kubernetes-dashboard,storage-gluster,istio-operator";

/// Namespaces an operation is restricted to
#[derive(Parser, Debug, Clone)]
pub struct Scope {
    /// Comma separated list of namespaces to operate on
    #[clap(
        short,
        long,
        value_delimiter = ',',
        default_value = DEFAULT_NAMESPACES,
        value_parser = clap::builder::NonEmptyStringValueParser::new()
    )]
    pub namespaces: Vec<String>,
    /// Operate on all namespaces, overrides --namespaces
    #[clap(short = 'A', long)]
    pub all_namespaces: bool,
    /// Format of the result: text or json (default: "text")
    #[clap(short, long, default_value = "text")]
    pub output: String,
}

impl Scope {
    /// The namespace filter to use, empty for all namespaces
    pub fn namespaces(&self) -> Vec<String> {
        if self.all_namespaces {
            Vec::new()
        } else {
            self.namespaces.clone()
        }
    }
}

use clap::Parser;
use std::ffi::OsString;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CliConfig {
    /// Port to listen to.
    #[arg(long, short, default_value_t = 3000)]
    pub port: u16,
    /// Externally used URL for the start page of the frontend.
    #[arg(long, default_value = "http://127.0.0.1:3000/")]
    pub frontend_prefix: String,
    /// Base URL of the author list service, the widget queries `<URL>/api/authors`.
    #[arg(
        long,
        env = "AUTHORLIST_SERVICE_URL",
        default_value = "https://authorlist.icecube.wisc.edu"
    )]
    pub service_url: String,
    /// Formatting used when neither the page nor the URL fragment select one.
    #[arg(long, default_value = "web")]
    pub default_formatting: String,
    /// Minutes after which an unused widget instance is discarded.
    #[arg(long, default_value_t = 60)]
    pub instance_timeout: i64,
}

impl Default for CliConfig {
    fn default() -> Self {
        let empty_arguments: Vec<OsString> = Vec::default();
        Parser::parse_from(empty_arguments)
    }
}

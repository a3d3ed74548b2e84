use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "argochat-server")]
#[command(about = "Natural-language query server for ARGO float data", long_about = None)]
pub struct ServerArgs {
    #[arg(long = "config", help = "Path to a YAML or JSON config file")]
    pub config: Option<PathBuf>,

    #[arg(long = "host", help = "Address to bind the HTTP server to")]
    pub host: Option<String>,

    #[arg(short = 'p', long = "port", help = "Port to bind the HTTP server to")]
    pub port: Option<u16>,

    #[arg(
        long = "max-iterations",
        help = "Maximum LLM calls per query before answering incomplete"
    )]
    pub max_iterations: Option<usize>,

    #[arg(
        long = "tool-host",
        help = "Command that starts the tool host (defaults to argochat-tools next to this binary)"
    )]
    pub tool_host: Option<String>,

    #[arg(short = 'v', long = "verbose", help = "Enable debug logging")]
    pub verbose: bool,
}

#[derive(Parser, Debug, Default)]
#[command(name = "argochat-tools")]
#[command(about = "ARGO database tool host speaking JSON-RPC over stdio", long_about = None)]
pub struct ToolHostArgs {
    #[arg(long = "config", help = "Path to a YAML or JSON config file")]
    pub config: Option<PathBuf>,

    #[arg(long = "database", help = "Path to the SQLite database with ARGO tables")]
    pub database: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", help = "Enable debug logging (stderr)")]
    pub verbose: bool,
}

#[derive(Parser, Debug, Default)]
#[command(name = "argochat")]
#[command(about = "Ask questions about ARGO oceanography data", long_about = None)]
pub struct ChatArgs {
    #[arg(long = "config", help = "Path to a YAML or JSON config file")]
    pub config: Option<PathBuf>,

    #[arg(
        long = "server-url",
        help = "Base URL of argochat-server (e.g., http://127.0.0.1:8000)"
    )]
    pub server_url: Option<String>,

    #[arg(long = "timeout", help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long = "tools", help = "List the tools available to the assistant and exit")]
    pub list_tools: bool,

    #[arg(help = "Question to ask; starts an interactive chat when omitted")]
    pub question: Vec<String>,
}

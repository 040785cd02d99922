use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "geiger-server-rs",
    version,
    about = "Geiger counter telemetry server"
)]
pub struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, default_value_t = 8000)]
    pub port: u16,
    #[arg(long, default_value_t = false)]
    pub print_openapi: bool,
}

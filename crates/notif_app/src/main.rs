use notif_app::app::{run, AppConfig, Command};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let config = AppConfig::from_env().unwrap_or_default();
    let result = Command::parse(std::env::args().skip(1))
        .and_then(|command| run(config, command, &mut std::io::stdout().lock()));
    if let Err(err) = result {
        eprintln!("notif: {err:#}");
        std::process::exit(1);
    }
}

mod command;
mod config;
mod schema;
mod util;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    command::run()
}

mod cli;
mod config;
mod error;
mod library;
mod naming;
mod runtime;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()?;
    Ok(())
}

mod cli;
mod develop;
mod recipe;

use anyhow::Result;
use clap::Parser;
use halide_core::{cameras, filters, layout, preview};
use halide_metadata::ExifData;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, InfoArgs, ListArgs};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Develop(args) => develop::run(args).await,
        Command::Filters(args) => cmd_filters(args),
        Command::Layouts(args) => cmd_layouts(args),
        Command::Cameras(args) => cmd_cameras(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn cmd_filters(args: ListArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(filters::all())?);
        return Ok(());
    }
    for f in filters::all() {
        let tags: Vec<&str> = f.categories.iter().map(|c| c.label()).collect();
        let css = preview::css_filter(f);
        println!(
            "{:<16} {:<18} {:<32} {}",
            f.id,
            f.name,
            tags.join(", "),
            if css.is_empty() { "-" } else { css.as_str() }
        );
    }
    Ok(())
}

fn cmd_layouts(args: ListArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(layout::all())?);
        return Ok(());
    }
    for l in layout::all() {
        println!("{:<10} {:>4}x{:<5} {}", l.id, l.width, l.height, l.label);
    }
    Ok(())
}

fn cmd_cameras(args: ListArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(cameras::all())?);
        return Ok(());
    }
    for c in cameras::all() {
        println!(
            "{:<14} {:<10} {:<16} {:<16} {}",
            c.id, c.brand, c.name, c.filter_id, c.description
        );
    }
    Ok(())
}

fn cmd_info(args: InfoArgs) -> Result<()> {
    let exif = ExifData::from_file(&args.input)?;
    for (label, value) in exif.summary_lines() {
        println!("{label:<14} {value}");
    }
    Ok(())
}

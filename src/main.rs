//! DOL inspection tool
//!
//! Decodes a GameCube/Wii DOL executable, prints its sections and the derived bss layout,
//! then maps the whole image into an in-memory address space.

use anyhow::{Context, Result};
use clap::Parser;
use dol::{AddressSpace, BssLayout, DolHeader, DolLoader, LoaderConfig};
use gekko_core::VirtAddr;
use std::path::PathBuf;

mod logging;

#[derive(Parser)]
#[command(name = "dolinfo")]
#[command(version)]
#[command(about = "Inspect and map GameCube/Wii DOL executables")]
struct Cli {
    /// DOL file to inspect
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Image base address (hex format: 0x80000000 or decimal)
    #[arg(long, value_parser = parse_address, default_value = "0x80000000")]
    image_base: u32,

    /// Do not derive the .sbss block following .data6
    #[arg(long)]
    no_sbss: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)?;

    let input = std::fs::read(&cli.path)
        .with_context(|| format!("failed to read {}", cli.path.display()))?;

    let header = DolHeader::parse(&input)
        .with_context(|| format!("{} is not a DOL executable", cli.path.display()))?;

    print_sections(&header);

    let config = LoaderConfig::new()
        .with_image_base(VirtAddr::new(cli.image_base))
        .with_sbss(!cli.no_sbss);
    let mut space = AddressSpace::new(config.image_base());
    let loaded = DolLoader::new(config)
        .load_header(&header, input.as_slice(), &mut space)
        .context("failed to load DOL")?;

    print_bss(&loaded.bss);

    println!("\n=== Address space @ {} ===", space.image_base());
    for block in space.blocks() {
        println!(
            "  {:<8} {}..={} {} {}",
            block.name(),
            block.range().start(),
            block.range().end(),
            block.flags(),
            if block.is_initialized() { "file" } else { "zero" }
        );
    }
    for failure in &loaded.failures {
        println!(
            "  {:<8} {} (+{:#x}) not mapped: {}",
            failure.name, failure.virt_addr, failure.size, failure.error
        );
    }

    let covered = space.covered();
    println!(
        "  {} bytes in {} contiguous ranges",
        covered.sum(),
        covered.len()
    );

    match space.read_u32(loaded.entry_point) {
        Some(word) => println!("\nEntry point: {} ({word:#010x})", loaded.entry_point),
        None => println!("\nEntry point: {} (unmapped)", loaded.entry_point),
    }

    Ok(())
}

fn print_sections(header: &DolHeader) {
    println!("=== Sections ===");
    for section in header.sections() {
        println!(
            "  {:<8} {} (+{:#x}) from file offset {:#x}",
            section.name, section.address, section.size, section.offset
        );
    }
}

fn print_bss(layout: &BssLayout) {
    println!("\n=== Zero-initialized ===");
    if layout.bss_span.is_none() {
        println!("  bss address lies above .data6, no .bss");
    }
    for region in [layout.bss, layout.sbss].into_iter().flatten() {
        println!("  {:<8} {} (+{:#x})", region.name, region.start, region.size);
    }
}

fn parse_address(address_str: &str) -> Result<u32> {
    let address = if let Some(hex) = address_str
        .strip_prefix("0x")
        .or_else(|| address_str.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)
    } else {
        address_str.parse()
    };
    address.with_context(|| format!("invalid address: {address_str}"))
}

use clap::Parser;
use simd_detector::core::config::DetectorConfig;
use simd_detector::core::report::Report;
use simd_detector::core::runtime::RuntimeConfig;
use simd_detector::{Extension, FeatureDetector};
use std::path::PathBuf;
use sysinfo::System;

#[derive(Parser, Debug)]
#[command(author, version, about = "Report x86 SIMD extension support", long_about = None)]
struct Args {
    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Write the JSON report to a file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pin to this logical core before probing
    #[arg(short, long)]
    core: Option<usize>,

    /// Exit 0 if this extension is supported, 1 otherwise
    #[arg(long)]
    has: Option<Extension>,

    /// Characters trimmed from the brand string
    #[arg(long)]
    trim: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so `--json` output stays parseable.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();

    let mut config = DetectorConfig::from_env()?;
    if let Some(core) = args.core {
        config.pin_core = Some(core);
    }
    if let Some(trim) = args.trim {
        config.trim = trim;
    }

    let cpu = FeatureDetector::from_config(&config)?;

    if let Some(ext) = args.has {
        let supported = cpu.has(ext);
        tracing::info!(extension = %ext, supported, "query");
        std::process::exit(if supported { 0 } else { 1 });
    }

    let report = Report::collect(&cpu);

    if let Some(path) = &args.output {
        report.write_json(path)?;
        eprintln!("Exported report to {}", path.display());
    }

    if args.json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    let mut sys = System::new_all();
    sys.refresh_all();
    let os_brand = sys.global_cpu_info().brand().trim().to_string();

    println!("CPU:           {}", report.brand);
    if !os_brand.is_empty() && os_brand != report.brand {
        println!("OS reports:    {}", os_brand);
    }
    println!("Logical cores: {}", RuntimeConfig::core_count());
    if let Some(core) = config.pin_core {
        println!("Pinned core:   {}", core);
    }
    println!(
        "Leaves:        basic {:#x}, extended {:#x}",
        report.max_basic_leaf, report.max_extended_leaf
    );
    println!();
    for ext in &report.extensions {
        let state = match (ext.supported, ext.set) {
            (true, _) => "yes",
            (false, true) => "cpu only",
            (false, false) => "no",
        };
        println!("  {:<8} {:<14} {}", ext.name, ext.source, state);
    }
    println!();
    println!("Supported: {}", report.supported_names().join(" "));
    Ok(())
}

//! table-runner: reproduce the survey tables from a data file.
//!
//! Usage:
//!   table-runner --data public.dat --tables 2,3,6,9 --out-dir output
//!   table-runner --data public.dat --tables employment,price_components
//!   table-runner --data public.dat --mode fixed --codebook layout.json --json
//!   table-runner --synthetic 400 --seed 7

use anyhow::Result;
use minwage_core::{
    config::RunConfig,
    dataset::Dataset,
    reader::{read_dataset_file, InputMode},
    report::{write_json, write_report, Table},
    synthetic::generate_survey,
    tables::{build_table, TableId},
};
use std::{env, path::Path, thread};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match arg_value(&args, "--config") {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(mode) = arg_value(&args, "--mode") {
        config.input_mode = mode.parse::<InputMode>()?;
    }
    if let Some(path) = arg_value(&args, "--codebook") {
        config.codebook = Some(path.to_string());
    }
    if let Some(list) = arg_value(&args, "--tables") {
        config.tables = list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<TableId>)
            .collect::<Result<Vec<_>, _>>()?;
    }
    config.validate()?;

    let out_dir = arg_value(&args, "--out-dir").unwrap_or("./output");
    let json = args.iter().any(|a| a == "--json");
    let seed = parse_arg(&args, "--seed", 42u64);
    let synthetic = parse_arg(&args, "--synthetic", 0usize);

    let records = match arg_value(&args, "--data") {
        Some(path) => {
            let codebook = config.load_codebook()?;
            let report = read_dataset_file(path, &codebook, config.input_mode, config.bad_records)?;
            if !report.rejected.is_empty() {
                println!("  skipped {} malformed records", report.rejected.len());
            }
            report.records
        }
        None if synthetic > 0 => generate_survey(seed, synthetic),
        None => anyhow::bail!("either --data <file> or --synthetic <stores> is required"),
    };

    let dataset = Dataset::new(records, config.derivation.clone())?;
    print_summary(&dataset);

    std::fs::create_dir_all(out_dir)
        .map_err(|e| anyhow::anyhow!("Cannot create {out_dir}: {e}"))?;

    // One worker per table over the shared, read-only dataset.
    let results: Vec<(TableId, Result<Table>)> = thread::scope(|scope| {
        let handles: Vec<_> = config
            .tables
            .iter()
            .map(|&id| {
                let dataset = &dataset;
                (id, scope.spawn(move || build_table(id, dataset)))
            })
            .collect();
        handles
            .into_iter()
            .map(|(id, handle)| {
                let table = match handle.join() {
                    Ok(result) => result.map_err(anyhow::Error::from),
                    Err(_) => Err(anyhow::anyhow!("{id} worker panicked")),
                };
                (id, table)
            })
            .collect()
    });

    for (id, table) in results {
        let table = table?;
        println!("{}", table.render());
        let stem = format!("table_{}", id.number());
        write_report(Path::new(out_dir).join(format!("{stem}.txt")), &table)?;
        if json {
            write_json(Path::new(out_dir).join(format!("{stem}.json")), &table)?;
        }
    }

    Ok(())
}

fn print_summary(dataset: &Dataset) {
    let summary = dataset.summary();
    log::info!("dataset summary: {summary:?}");
    println!("Minimum-wage survey: table-runner");
    println!("  stores:              {}", summary.total);
    println!("  New Jersey:          {}", summary.new_jersey);
    println!("  Pennsylvania:        {}", summary.pennsylvania);
    for (chain, count) in &summary.chains {
        println!("  {chain:<20} {count}");
    }
    println!("  permanently closed:  {}", summary.permanently_closed);
    println!("  temporarily closed:  {}", summary.temporarily_closed);
    println!("  missing wave-1 FTE:  {}", summary.missing_fte_first);
    println!("  missing wave-2 FTE:  {}", summary.missing_fte_second);
    println!();
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

use stepcurve::fixed::MAX_DECIMALS;
use stepcurve::{CurveEditor, LinearParams};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::Write;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "stepcurve",
    version,
    about = "Step-priced ticket curve builder + validator"
)]
struct Args {
    #[arg(long, default_value_t = 100_000)]
    max_tickets: u64,
    #[arg(long, default_value_t = 10)]
    num_steps: u32,
    #[arg(long, default_value_t = 10.0)]
    base_price: f64,
    #[arg(long, default_value_t = 1.0)]
    price_delta: f64,
    #[arg(long, default_value_t = 18)]
    decimals: u32,

    /// JSON array of {"rangeTo", "price"} contract steps; overrides the linear parameters
    #[arg(long)]
    import: Option<String>,

    /// Step to split after, applied in order (repeatable)
    #[arg(long = "insert-after")]
    insert_after: Vec<usize>,
    /// Weighted price drag as INDEX:PRICE, applied in order (repeatable)
    #[arg(long)]
    drag: Vec<String>,

    #[arg(long, default_value = "out")]
    out_dir: String,
    #[arg(long = "no-write", action = clap::ArgAction::SetFalse, default_value_t = true)]
    write: bool,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Serialize)]
struct Row {
    step: usize,
    range_from: u64,
    range_to: u64,
    tickets: u64,
    price: f64,
    price_scaled: String,
    revenue_step: f64,
    revenue_cum: f64,
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "stepcurve=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_drag(spec: &str) -> Result<(usize, f64)> {
    let (idx, price) = spec
        .split_once(':')
        .ok_or_else(|| anyhow!("drag must look like INDEX:PRICE (got {})", spec))?;
    let idx: usize = idx.trim().parse().with_context(|| format!("bad drag index in {}", spec))?;
    let price: f64 = price.trim().parse().with_context(|| format!("bad drag price in {}", spec))?;
    if !price.is_finite() {
        return Err(anyhow!("drag price must be finite (got {})", price));
    }
    Ok((idx, price))
}

fn validate_inputs(args: &Args) -> Result<Vec<(usize, f64)>> {
    if args.decimals > MAX_DECIMALS {
        return Err(anyhow!("decimals must be ≤ {} (got {})", MAX_DECIMALS, args.decimals));
    }
    if !args.base_price.is_finite() || !args.price_delta.is_finite() {
        return Err(anyhow!(
            "base_price and price_delta must be finite (got {}, {})",
            args.base_price,
            args.price_delta
        ));
    }
    if args.import.is_none() && (args.max_tickets == 0 || args.num_steps == 0) {
        return Err(anyhow!(
            "max_tickets and num_steps must be ≥ 1 (got {}, {})",
            args.max_tickets,
            args.num_steps
        ));
    }
    args.drag.iter().map(|d| parse_drag(d)).collect()
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let drags = validate_inputs(&args)?;

    let mut editor = match &args.import {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            CurveEditor::from_json(&json, args.decimals)?
        }
        None => CurveEditor::with_params(
            LinearParams {
                max_tickets: args.max_tickets,
                num_steps: args.num_steps,
                base_price: args.base_price,
                price_delta: args.price_delta,
            },
            args.decimals,
        )?,
    };

    for &after in &args.insert_after {
        editor.insert_step_between(after);
    }
    for &(idx, price) in &drags {
        editor.drag_price(idx, price);
    }

    let rep = editor.report();
    println!(
        "[stepcurve] steps={} max_tickets={} custom={} linear={} monotone={} revenue={:.6}",
        rep.steps,
        rep.max_tickets,
        editor.is_custom(),
        rep.linear,
        rep.monotone_ok,
        rep.total_revenue
    );
    if args.verbose {
        println!("  price range: {:.6} .. {:.6}", rep.min_price, rep.max_price);
        for (i, s) in editor.steps().iter().enumerate() {
            println!("  step {:>3}: range_to={:<10} price={:.6}", i + 1, s.range_to, s.price);
        }
    }
    for e in &rep.errors {
        println!("  error: {}", e);
    }

    if args.write {
        create_dir_all(&args.out_dir)?;
        write_schedule_csv(&args.out_dir, &editor)?;
        info!(out_dir = %args.out_dir, "wrote schedule.csv");
    }

    let payload = match editor.contract_steps() {
        Ok(p) => p,
        Err(e) => {
            warn!("skipping steps.json: {}", e);
            return Err(e.into());
        }
    };
    if args.write {
        let path = format!("{}/steps.json", args.out_dir);
        let mut file = File::create(&path)?;
        serde_json::to_writer_pretty(&mut file, &payload)?;
        writeln!(file)?;
        info!(%path, "wrote contract steps");
    }
    Ok(())
}

fn write_schedule_csv(out_dir: &str, editor: &CurveEditor) -> Result<()> {
    let file_path = format!("{}/schedule.csv", out_dir);
    let mut file = File::create(&file_path)?;

    let p = editor.params();
    writeln!(file, "# Step Curve Schedule")?;
    writeln!(
        file,
        "# Mode: {}",
        if editor.is_custom() { "custom" } else { "linear" }
    )?;
    writeln!(
        file,
        "# Params: max_tickets={}, num_steps={}, base_price={}, price_delta={}",
        p.max_tickets, p.num_steps, p.base_price, p.price_delta
    )?;
    writeln!(file, "# Decimals: {}", editor.decimals())?;
    writeln!(file)?;

    let mut wtr = csv::Writer::from_writer(file);
    let mut prev_end = 0_u64;
    let mut r_cum = 0.0;
    for (i, s) in editor.steps().iter().enumerate() {
        let tickets = s.range_to.saturating_sub(prev_end);
        let r_step = tickets as f64 * s.price;
        r_cum += r_step;
        wtr.serialize(Row {
            step: i + 1,
            range_from: prev_end,
            range_to: s.range_to,
            tickets,
            price: s.price,
            price_scaled: s.price_scaled.to_string(),
            revenue_step: r_step,
            revenue_cum: r_cum,
        })?;
        prev_end = s.range_to;
    }
    wtr.flush()?;
    Ok(())
}

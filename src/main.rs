//! lmi illustrate — command-line front end for the illustration engine.
//!
//! Reads one `Input` (or a census roster) from a JSON or CSV file, runs it
//! through [`lmi::illustrate`], prints a per-year summary for the governing
//! basis, and writes the full variant detail to a CSV file alongside it.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lmi::ledger::basis::{Basis, RunBasisSelector};
use lmi::rates::loader::CsvRateProvider;
use lmi::rates::table::TableRateProvider;
use lmi::{illustrate, EmissionFlags, IllustrationSource};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BasisArg {
    Current,
    Guaranteed,
    Midpoint,
    IllustrationReg,
    Nasd,
    AllBases,
}

impl From<BasisArg> for RunBasisSelector {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::Current => RunBasisSelector::CurrBasisOnly,
            BasisArg::Guaranteed => RunBasisSelector::GuarBasisOnly,
            BasisArg::Midpoint => RunBasisSelector::MdptBasisOnly,
            BasisArg::IllustrationReg => RunBasisSelector::IllustrationReg,
            BasisArg::Nasd => RunBasisSelector::Nasd,
            BasisArg::AllBases => RunBasisSelector::AllBases,
        }
    }
}

/// Run a universal life illustration from an input file.
#[derive(Debug, Parser)]
#[command(name = "lmi", version, about)]
struct Cli {
    /// Path to a .json (single Input or Input array) or .csv census roster.
    input: PathBuf,

    /// Which bases to run. Ignored for census rosters, which always run
    /// the illustration-regulation triple.
    #[arg(long, value_enum, default_value_t = BasisArg::IllustrationReg)]
    basis: BasisArg,

    /// Write the governing basis's full per-year detail to this CSV path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Report wall-clock parse/calculate/output timings.
    #[arg(long)]
    timings: bool,

    /// Directory of rate-table CSVs (see `rates::loader`). Falls back to
    /// a built-in pricing table when not given or unreadable.
    #[arg(long)]
    rates_dir: Option<PathBuf>,

    /// Projection length to size the CSV rate tables to, when `--rates-dir`
    /// is given.
    #[arg(long, default_value_t = 360)]
    rates_len: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let provider: Box<dyn lmi::RateProvider> = match &cli.rates_dir {
        Some(dir) => match CsvRateProvider::load_from(dir, cli.rates_len) {
            Ok(provider) => Box::new(provider),
            Err(err) => {
                log::warn!("falling back to built-in pricing table: {err}");
                Box::new(TableRateProvider::default_pricing(45, 30))
            }
        },
        None => Box::new(TableRateProvider::default_pricing(45, 30)),
    };

    let mut flags = EmissionFlags::default();
    if cli.timings {
        flags = EmissionFlags(flags.0 | EmissionFlags::TIMINGS);
    }

    let (ledger, timings) = illustrate(IllustrationSource::Path(cli.input), flags, &provider)?;

    let governing: Basis = RunBasisSelector::from(cli.basis).governing_basis();
    let variant = ledger
        .variant
        .get(&governing)
        .or_else(|| ledger.variant.values().next())
        .expect("a run always populates at least one basis");

    println!("Product: {}", ledger.invariant.product_name);
    println!("Composite: {}", ledger.is_composite);
    println!(
        "{:>5} {:>14} {:>14} {:>14} {:>10} {:>6}",
        "Year", "EOY AV", "EOY CSV", "EOY DB", "Premium", "MEC"
    );
    for year in 0..variant.years_to_maturity() {
        println!(
            "{:>5} {:>14.2} {:>14.2} {:>14.2} {:>10.2} {:>6}",
            year + 1,
            variant.eoy_av_total(year),
            variant.eoy_csv_net[year],
            variant.eoy_death_benefit[year],
            variant.gross_premium[year],
            variant.is_mec_by_year[year],
        );
    }

    if let Some(lapse_year) = variant.lapse_year {
        println!("\nLapsed in policy year {lapse_year}.");
    }

    if let Some(out_path) = cli.out {
        write_detail_csv(&out_path, variant)?;
        println!("\nFull detail written to: {}", out_path.display());
    }

    if cli.timings {
        println!(
            "\nTimings: parse={:?} calculate={:?} output={:?}",
            timings.parse, timings.calculate, timings.output
        );
    }

    Ok(())
}

fn write_detail_csv(path: &PathBuf, variant: &lmi::ledger::variant::VariantPart) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "year",
        "eoy_av_general",
        "eoy_av_separate",
        "eoy_csv_net",
        "eoy_death_benefit",
        "gross_premium",
        "coi_charge",
        "is_mec",
    ])?;
    for year in 0..variant.years_to_maturity() {
        writer.write_record([
            (year + 1).to_string(),
            format!("{:.2}", variant.eoy_av_general[year]),
            format!("{:.2}", variant.eoy_av_separate[year]),
            format!("{:.2}", variant.eoy_csv_net[year]),
            format!("{:.2}", variant.eoy_death_benefit[year]),
            format!("{:.2}", variant.gross_premium[year]),
            format!("{:.2}", variant.coi_charge[year]),
            variant.is_mec_by_year[year].to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use protocheck::checks;
use protocheck::config::{self, AppContext};
use protocheck::db::{self, count_tables, open_database, open_registry, StoreSnapshot};
use protocheck::engine::{self, ReconcileOptions};
use protocheck::export;
use protocheck::ingest;
use protocheck::models::{ComplianceStatus, Professional};
use protocheck::ocr::UnavailableExtractor;
use protocheck::registry::{self, FuzzyMatcher, NameMatchStrategy, SubstringMatcher};

/// Billing compliance checks for a dental practice.
#[derive(Parser, Debug)]
#[command(name = "protocheck", version, about, long_about = None)]
struct Cli {
    #[clap(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct GlobalOpts {
    /// Billing store database (defaults to the app data dir)
    #[arg(global = true, long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// RPPS registry database (defaults to the app data dir)
    #[arg(global = true, long, value_name = "PATH")]
    registry_db: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the data directory and initialize both databases
    Init,

    /// Load a practice-software export into the billing store
    Load {
        #[command(subcommand)]
        source: LoadSource,
    },

    /// Reconcile lab sheets against invoices over a date range
    Reconcile {
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: NaiveDate,

        #[arg(long, value_name = "YYYY-MM-DD")]
        end: NaiveDate,

        /// Matching window in days around each lab sheet date
        #[arg(long, value_name = "DAYS")]
        tolerance: Option<i64>,

        /// Write the result table as CSV instead of a summary line
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Run the billing validation rules against the store
    Validate {
        /// Directory receiving one CSV per rule
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Write the whole report as one JSON document
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },

    /// RPPS registry operations
    Rpps {
        #[command(subcommand)]
        action: RppsAction,
    },
}

#[derive(Subcommand, Debug)]
enum LoadSource {
    /// Prosthetic procedure code reference (.csv, .txt or .tsv)
    Ccam {
        #[arg(long)]
        file: PathBuf,
    },
    /// Invoice export
    Invoices {
        #[arg(long)]
        file: PathBuf,
    },
    /// Scanned document index
    Scans {
        #[arg(long)]
        file: PathBuf,
    },
    /// Quote export
    Quotes {
        #[arg(long)]
        file: PathBuf,
    },
    /// Deleted act export, filtered to prosthetic codes on load
    Deleted {
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum RppsAction {
    /// Import the official pipe-delimited extraction
    Import {
        #[arg(long)]
        file: PathBuf,

        /// Version label recorded on each row (omitted when empty)
        #[arg(long, default_value = "")]
        extraction_version: String,
    },
    /// Look up a professional by RPPS identifier
    Find { rpps_id: String },
    /// Search professionals by last name and optionally first name
    Search {
        last_name: String,

        #[arg(default_value = "")]
        first_name: String,

        /// Plain substring matching instead of fuzzy scoring
        #[arg(long)]
        substring: bool,

        /// Minimum score (0..=100) both name terms must reach
        #[arg(long, value_name = "SCORE")]
        min_score: Option<u32>,
    },
    /// Classify a professional as active, deregistered or not found
    Status { rpps_id: String },
    /// Print registry quality statistics as JSON
    Quality,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    if let Err(err) = run(cli) {
        tracing::error!(error = %err, "Command failed");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut ctx = AppContext::default();
    if let Some(db) = cli.global.db {
        ctx.store_db = db;
    }
    if let Some(registry_db) = cli.global.registry_db {
        ctx.registry_db = registry_db;
    }

    match cli.command {
        Command::Init => init_databases(&ctx),
        Command::Load { source } => load(&ctx, source),
        Command::Reconcile {
            start,
            end,
            tolerance,
            out,
        } => reconcile(&ctx, start, end, tolerance, out),
        Command::Validate { out_dir, json } => validate(&ctx, out_dir, json),
        Command::Rpps { action } => rpps(&ctx, action),
    }
}

fn init_databases(ctx: &AppContext) -> Result<(), Box<dyn Error>> {
    for path in [&ctx.store_db, &ctx.registry_db] {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let store = open_database(&ctx.store_db)?;
    let registry = open_registry(&ctx.registry_db)?;

    println!(
        "Store ready: {} ({} tables)",
        ctx.store_db.display(),
        count_tables(&store)?
    );
    println!(
        "Registry ready: {} ({} tables)",
        ctx.registry_db.display(),
        count_tables(&registry)?
    );
    Ok(())
}

fn load(ctx: &AppContext, source: LoadSource) -> Result<(), Box<dyn Error>> {
    let conn = open_database(&ctx.store_db)?;

    match source {
        LoadSource::Ccam { file } => {
            let codes = ingest::load_ccam_file(&file)?;
            db::upsert_procedure_codes(&conn, &codes)?;
            println!("Loaded {} prosthetic procedure codes", codes.len());
        }
        LoadSource::Invoices { file } => {
            let invoices = ingest::load_invoices_file(&file)?;
            db::upsert_invoices(&conn, &invoices)?;
            println!("Loaded {} invoices", invoices.len());
        }
        LoadSource::Scans { file } => {
            let scans = ingest::load_scans_file(&file)?;
            db::insert_scans(&conn, &scans)?;
            println!("Loaded {} scans", scans.len());
        }
        LoadSource::Quotes { file } => {
            let quotes = ingest::load_quotes_file(&file)?;
            db::upsert_quotes(&conn, &quotes)?;
            println!("Loaded {} quotes", quotes.len());
        }
        LoadSource::Deleted { file } => {
            let acts = ingest::load_deleted_file(&file)?;
            let kept = ingest::filter_prosthetics(&conn, acts)?;
            db::insert_deleted_acts(&conn, &kept)?;
            println!("Loaded {} deleted prosthetic acts", kept.len());
        }
    }
    Ok(())
}

fn reconcile(
    ctx: &AppContext,
    start: NaiveDate,
    end: NaiveDate,
    tolerance: Option<i64>,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let conn = open_database(&ctx.store_db)?;
    let opts = ReconcileOptions::new(start, end)
        .with_tolerance(tolerance.unwrap_or(ctx.tolerance_days));

    let rows = engine::run_from_store(&conn, &opts)?;
    let compliant = rows
        .iter()
        .filter(|r| r.status == ComplianceStatus::Compliant)
        .count();

    match out {
        Some(path) => {
            export::write_reconciliation_csv(&rows, &path)?;
            println!("Wrote {} rows to {}", rows.len(), path.display());
        }
        None => println!(
            "{} rows: {} compliant, {} inconsistent",
            rows.len(),
            compliant,
            rows.len() - compliant
        ),
    }
    Ok(())
}

fn validate(
    ctx: &AppContext,
    out_dir: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let conn = open_database(&ctx.store_db)?;
    let snapshot = StoreSnapshot::load(&conn)?;

    // No OCR engine is wired into the CLI; the material rule reads every
    // lab document as "unknown" and reports nothing.
    let report = checks::run_all(&snapshot, &UnavailableExtractor);

    println!("{} findings", report.issue_count());
    println!("  deleted quotes:     {}", report.deleted_quotes.len());
    println!("  material mismatch:  {}", report.material_mismatches.len());
    println!("  deleted prostheses: {}", report.deleted_prostheses.len());
    println!("  missing documents:  {}", report.missing_insurance_docs.len());
    println!("  recreated quotes:   {}", report.recreated_quotes.len());

    if let Some(dir) = out_dir {
        let paths = export::write_validation_csvs(&report, &dir)?;
        println!("Wrote {} files to {}", paths.len(), dir.display());
    }
    if let Some(path) = json {
        export::write_validation_json(&report, &path)?;
        println!("Wrote report to {}", path.display());
    }
    Ok(())
}

fn rpps(ctx: &AppContext, action: RppsAction) -> Result<(), Box<dyn Error>> {
    match action {
        RppsAction::Import {
            file,
            extraction_version,
        } => {
            let mut conn = open_registry(&ctx.registry_db)?;
            let report = registry::import_registry(&mut conn, &file, &extraction_version)?;
            println!(
                "Imported {} of {} rows ({} skipped)",
                report.rows_inserted, report.rows_read, report.rows_skipped
            );
        }
        RppsAction::Find { rpps_id } => {
            let conn = open_registry(&ctx.registry_db)?;
            match registry::get_by_id(&conn, &rpps_id)? {
                Some(p) => print_professional(&p),
                None => println!("No professional found for {rpps_id}"),
            }
        }
        RppsAction::Search {
            last_name,
            first_name,
            substring,
            min_score,
        } => {
            let conn = open_registry(&ctx.registry_db)?;
            let strategy: &dyn NameMatchStrategy = if substring || ctx.substring_match {
                &SubstringMatcher
            } else {
                &FuzzyMatcher
            };
            let results = registry::search_by_name(
                &conn,
                &last_name,
                &first_name,
                strategy,
                min_score.unwrap_or(ctx.min_match_score),
            )?;

            println!("{} match(es)", results.len());
            for p in &results {
                print_professional(p);
            }
        }
        RppsAction::Status { rpps_id } => {
            let conn = open_registry(&ctx.registry_db)?;
            let report = registry::classify_status(&conn, &rpps_id)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        RppsAction::Quality => {
            let conn = open_registry(&ctx.registry_db)?;
            let report = registry::quality_report(&conn)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn print_professional(p: &Professional) {
    println!(
        "{}  {}  {}  {}",
        p.rpps_id,
        p.display_name(),
        p.profession_label.as_deref().unwrap_or("?"),
        p.status.as_deref().unwrap_or("?"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    use protocheck::engine::DEFAULT_TOLERANCE_DAYS;
    use protocheck::registry::DEFAULT_MATCH_SCORE;

    fn temp_ctx(dir: &tempfile::TempDir) -> AppContext {
        AppContext {
            store_db: dir.path().join("store.db"),
            registry_db: dir.path().join("rpps.db"),
            tolerance_days: DEFAULT_TOLERANCE_DAYS,
            min_match_score: DEFAULT_MATCH_SCORE,
            substring_match: false,
        }
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_then_reconcile_produces_a_compliant_csv_row() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = temp_ctx(&dir);

        let ccam = write_file(&dir, "ccam.csv", "code,label\nHBMD001,Crown on molar\n");
        let scans = write_file(
            &dir,
            "scans.csv",
            "patient_id,doc_type,file_path,date\nP001,lab_sheet,scan1.pdf,2023-01-10\n",
        );
        let invoices = write_file(
            &dir,
            "invoices.csv",
            "invoice_no,date,patient_id,patient_name,doctor_id,doctor_name,code,qty,amount,fse_no,source_file\n\
             INV001,2023-01-12,P001,John Doe,D001,Dr. Smith,HBMD001,1,150.0,,jan.csv\n",
        );

        load(&ctx, LoadSource::Ccam { file: ccam }).unwrap();
        load(&ctx, LoadSource::Scans { file: scans }).unwrap();
        load(&ctx, LoadSource::Invoices { file: invoices }).unwrap();

        let out = dir.path().join("result.csv");
        reconcile(
            &ctx,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
            None,
            Some(out.clone()),
        )
        .unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        let mut lines = written.lines();
        assert!(lines.next().unwrap().starts_with("Patient,Date"));
        assert_eq!(
            lines.next().unwrap(),
            "John Doe,2023-01-10,Crown on molar,Crown on molar,Contrôlé,Validé,Conforme"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn validate_runs_clean_on_a_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = temp_ctx(&dir);

        let json = dir.path().join("report.json");
        validate(&ctx, None, Some(json.clone())).unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(report["deleted_quotes"].as_array().unwrap().len(), 0);
    }
}

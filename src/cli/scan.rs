//! `scan` command: detect arbitrage in an odds file.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use tabled::{Table, Tabled};
use tokio::signal;
use tracing::{info, warn};

use super::{InputKind, OutputFormat, ScanArgs};
use crate::adapter::upload::UploadFormat;
use crate::adapter::{export, odds_api, upload};
use crate::cli::output;
use crate::config::Config;
use crate::domain::{
    group_player_props, retain_prematch, Detector, Market, OpportunityBoard,
    OpportunityRecord, RecordView, UnknownStart, WarningLevel,
};
use crate::error::{Error, Result};

#[derive(Tabled)]
struct OpportunityRow {
    #[tabled(rename = "Match")]
    event: String,
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Bets")]
    bets: String,
    #[tabled(rename = "Stakes")]
    stakes: String,
    #[tabled(rename = "Profit %")]
    profit: String,
    #[tabled(rename = "Profit")]
    guaranteed: String,
    #[tabled(rename = "Warning")]
    warning: String,
}

impl From<&OpportunityRecord> for OpportunityRow {
    fn from(record: &OpportunityRecord) -> Self {
        let bets = record
            .legs()
            .iter()
            .map(|leg| {
                format!(
                    "{} @ {} {} ({})",
                    leg.outcome(),
                    leg.source(),
                    leg.price(),
                    leg.price().american_label()
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let stakes = record
            .allocation()
            .stakes()
            .iter()
            .map(|s| format!("{s:.2}"))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            event: format!("{}\n{}", record.event().match_name, record.event().sport),
            market: record.kind().to_string(),
            bets,
            stakes,
            profit: format!("{:.2}%", record.profit_percentage().round_dp(2)),
            guaranteed: format!("{:.2}", record.guaranteed_profit()),
            warning: record.warning().level.to_string(),
        }
    }
}

/// Run the scan once, or repeatedly in watch mode.
pub async fn execute(args: &ScanArgs, config: &Config) -> Result<()> {
    let config = &with_overrides(args, config)?;
    let detector = config.detector();
    let input = input_kind(args)?;

    let Some(secs) = args.watch else {
        let records = scan_file(&args.file, input, &detector, config)?;
        return render(args, &records);
    };

    let board = OpportunityBoard::new();
    let mut interval = tokio::time::interval(Duration::from_secs(secs.max(1)));
    info!(file = %args.file.display(), interval_secs = secs, "Watching odds file");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let sequence = board.begin();
                match scan_file(&args.file, input, &detector, config) {
                    Ok(records) => {
                        board.publish_as(sequence, records);
                        let batch = board.snapshot();
                        render(args, &batch.records)?;
                    }
                    Err(error) => warn!(error = %error, "Scan failed; keeping previous results"),
                }
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}

/// Config with `--stake` and `--min-profit` applied and re-validated.
fn with_overrides(args: &ScanArgs, config: &Config) -> Result<Config> {
    let mut config = config.clone();
    if let Some(stake) = args.stake {
        config.engine.total_stake = stake;
    }
    if let Some(min_profit) = args.min_profit {
        config.engine.min_profit_pct = min_profit;
    }
    config.validate()?;
    Ok(config)
}

fn input_kind(args: &ScanArgs) -> Result<InputKind> {
    if let Some(kind) = args.input {
        return Ok(kind);
    }
    match UploadFormat::from_path(&args.file) {
        Some(UploadFormat::Json) => Ok(InputKind::Json),
        Some(UploadFormat::Csv) => Ok(InputKind::Csv),
        None => Err(Error::Parse(format!(
            "cannot infer input format of {}; pass --input json|csv|feed",
            args.file.display()
        ))),
    }
}

/// Read the file, filter started events, and detect.
fn scan_file(
    path: &Path,
    input: InputKind,
    detector: &Detector,
    config: &Config,
) -> Result<Vec<OpportunityRecord>> {
    let (markets, unknown): (Vec<Market>, UnknownStart) = match input {
        InputKind::Json => (upload::load(path, UploadFormat::Json)?, UnknownStart::Keep),
        InputKind::Csv => (upload::load(path, UploadFormat::Csv)?, UnknownStart::Keep),
        InputKind::Feed => (
            odds_api::parse_feed(&std::fs::read_to_string(path)?)?,
            UnknownStart::Drop,
        ),
    };
    let markets = retain_prematch(markets, &config.schedule, unknown, Utc::now());
    Ok(detector.scan(&markets))
}

fn render(args: &ScanArgs, records: &[OpportunityRecord]) -> Result<()> {
    let view = RecordView::from(args.view);
    let selected = view.select(records);

    match args.output {
        OutputFormat::Table => {
            render_table(view, records, &selected);
            Ok(())
        }
        OutputFormat::Csv => {
            let mut sink = sink(args.out.as_deref())?;
            export::write_csv(&mut sink, selected)?;
            Ok(())
        }
        OutputFormat::Json => {
            let mut sink = sink(args.out.as_deref())?;
            serde_json::to_writer_pretty(&mut sink, &selected)?;
            writeln!(sink)?;
            Ok(())
        }
    }
}

fn sink(out: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match out {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    })
}

fn render_table(view: RecordView, records: &[OpportunityRecord], selected: &[&OpportunityRecord]) {
    if selected.is_empty() {
        output::section("Arbitrage opportunities");
        output::note("No arbitrage opportunities found.");
        return;
    }

    if view == RecordView::PlayerProp {
        for group in group_player_props(records) {
            output::section(&format!("{} - {}", group.player_name, group.prop_type));
            let rows: Vec<OpportunityRow> = group.records.iter().map(|r| (*r).into()).collect();
            output::table(&Table::new(rows).to_string());
        }
    } else {
        output::section(&format!("Arbitrage opportunities ({})", selected.len()));
        let rows: Vec<OpportunityRow> = selected.iter().map(|r| (*r).into()).collect();
        output::table(&Table::new(rows).to_string());
    }

    let critical = selected
        .iter()
        .filter(|r| r.warning().level == WarningLevel::Critical)
        .count();
    if critical > 0 {
        println!();
        output::warn(&format!(
            "{critical} opportunit{} flagged critical: verify the odds manually before betting",
            if critical == 1 { "y" } else { "ies" }
        ));
    }
}

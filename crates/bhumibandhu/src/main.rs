//! `bhumi` - CLI for bhumibandhu
//!
//! This binary provides the command-line interface for browsing, searching and
//! adding land records, converting areas and exporting records.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use bhumibandhu::cli::{
    AddCommand, Cli, Command, ConfigCommand, ConvertCommand, ExportCommand, FetchDocCommand,
    ListCommand, MapCommand, OutputFormat, SearchCommand, ShowCommand, StatsCommand,
};
use bhumibandhu::dashboard::{mapped_records, recent_records, DashboardStats, RecordBadge};
use bhumibandhu::documents::{self, FetchOutcome, LocalDocumentSource};
use bhumibandhu::units::{self, UnitKey, UNIT_TABLE};
use bhumibandhu::{export, init_logging, Config, LandRecord, LandRecordStore, LoadOutcome, Storage};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Config subcommands must work even when the config is broken
    if let Command::Config(config_cmd) = cli.command {
        return handle_config(cli.config, config_cmd);
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Convert(cmd) => handle_convert(&config, &cmd),
        Command::Units => {
            handle_units();
            Ok(())
        }
        Command::List(cmd) => handle_list(&open_store(&config)?, &config, &cmd),
        Command::Search(cmd) => handle_search(&open_store(&config)?, &config, &cmd),
        Command::Show(cmd) => handle_show(&open_store(&config)?, &config, &cmd),
        Command::Add(cmd) => handle_add(&mut open_store(&config)?, &cmd),
        Command::Stats(cmd) => handle_stats(&open_store(&config)?, &config, &cmd),
        Command::Map(cmd) => handle_map(&open_store(&config)?, &cmd),
        Command::Export(cmd) => handle_export(&open_store(&config)?, &config, &cmd),
        Command::FetchDoc(cmd) => handle_fetch_doc(&open_store(&config)?, &config, &cmd),
        Command::Status(cmd) => handle_status(&open_store(&config)?, cmd.json),
        // Handled before the configuration is loaded.
        Command::Config(_) => Ok(()),
    }
}

/// Open the database and load the record collection.
fn open_store(config: &Config) -> anyhow::Result<LandRecordStore> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("failed to open record database at {}", path.display()))?;

    let mut store = LandRecordStore::with_options(
        storage,
        config.storage.slot_key.clone(),
        config.records.clone(),
    )?;
    if let LoadOutcome::Seeded(count) = store.initialize().context("failed to load land records")? {
        eprintln!("Initialized record store with {count} sample records.");
    }
    Ok(store)
}

fn find_record<'a>(store: &'a LandRecordStore, land_id: &str) -> anyhow::Result<&'a LandRecord> {
    store
        .find(land_id)
        .ok_or_else(|| bhumibandhu::Error::RecordNotFound(land_id.to_string()).into())
}

fn handle_list(store: &LandRecordStore, config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let records: Vec<&LandRecord> = store.records().iter().collect();
    let limit = cmd.limit.unwrap_or(records.len());
    print_records(&records[..limit.min(records.len())], config, cmd.format)
}

fn handle_search(
    store: &LandRecordStore,
    config: &Config,
    cmd: &SearchCommand,
) -> anyhow::Result<()> {
    let mut results = store.search(&cmd.query);
    if let Some(limit) = cmd.limit {
        results.truncate(limit);
    }

    if results.is_empty() && cmd.format != OutputFormat::Json {
        println!("No records match \"{}\".", cmd.query.trim());
        return Ok(());
    }
    print_records(&results, config, cmd.format)
}

fn print_records(
    records: &[&LandRecord],
    config: &Config,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        OutputFormat::Table => {
            println!(
                "{:<17} {:<12} {:<22} {:<26} {:>14}  {}",
                "LAND ID", "SURVEY NO", "OWNER", "VILLAGE", "AREA (m²)", "STATUS"
            );
            for record in records {
                let area = record
                    .area_in(UnitKey::SqMeters)
                    .map_or_else(|| "-".to_string(), |v| format_area(v, config));
                println!(
                    "{:<17} {:<12} {:<22} {:<26} {:>14}  {}",
                    record.land_id,
                    record.survey_number,
                    record.current_owner,
                    record.village,
                    area,
                    RecordBadge::for_record(record)
                );
            }
        }
        OutputFormat::Plain => {
            for record in records {
                println!(
                    "{} | {} | {} | {}",
                    record.land_id, record.survey_number, record.current_owner, record.village
                );
            }
        }
    }
    Ok(())
}

fn handle_show(store: &LandRecordStore, config: &Config, cmd: &ShowCommand) -> anyhow::Result<()> {
    let record = find_record(store, &cmd.land_id)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!("Land Record {}", record.land_id);
    println!("==========================");
    println!("  Survey number:  {}", record.survey_number);
    println!("  Village:        {}", record.village);
    println!("  Current owner:  {}", record.current_owner);
    println!("  Status:         {}", RecordBadge::for_record(record));
    if let (Some(area), Some(unit)) = (&record.area, &record.unit) {
        match record.area_in(UnitKey::SqMeters) {
            Some(sq_m) => println!(
                "  Area:           {area} {unit} ({} m²)",
                format_area(sq_m, config)
            ),
            None => println!("  Area:           {area} {unit}"),
        }
    }
    if let Some(coords) = &record.coordinates {
        println!(
            "  Coordinates:    {:.6}, {:.6}",
            coords.latitude, coords.longitude
        );
    }
    if let Some(created_at) = &record.created_at {
        println!("  Created:        {created_at}");
    }
    if let Some(officer) = &record.officer_name {
        println!("  Officer:        {officer}");
    }
    if let Some(status) = &record.allotment_status {
        println!("  Allotment:      {status}");
    }
    if let Some(kind) = &record.legal_document_type {
        match &record.legal_document_url {
            Some(url) => println!("  Legal document: {kind} ({url})"),
            None => println!("  Legal document: {kind}"),
        }
    }

    println!();
    println!("[Ownership History]");
    if record.ownership_history.is_empty() {
        println!("  (none)");
    }
    for entry in &record.ownership_history {
        match &entry.transfer_reason {
            Some(reason) => println!("  {} - {}  {} ({reason})", entry.from, entry.to, entry.owner),
            None => println!("  {} - {}  {}", entry.from, entry.to, entry.owner),
        }
    }

    println!();
    println!("[Disputes]");
    if record.disputes.is_empty() {
        println!("  (none)");
    }
    for dispute in &record.disputes {
        print!("  {}  {:<14} {}", dispute.year, dispute.kind, dispute.status);
        match &dispute.description {
            Some(description) => println!("  {description}"),
            None => println!(),
        }
    }

    println!();
    println!("[Documents]");
    if record.documents.is_empty() {
        println!("  (none)");
    }
    for doc in &record.documents {
        match &doc.upload_date {
            Some(date) => println!("  {} ({date})  {}", doc.name, doc.link),
            None => println!("  {}  {}", doc.name, doc.link),
        }
    }

    if let Some(tdr) = &record.tdr {
        println!();
        println!("[TDR]");
        println!("  Certificate:    {}", tdr.certificate_id);
        println!("  Status:         {}", tdr.status);
        println!("  Units:          {} issued, {} available", tdr.units, tdr.available_units);
        if let Some(issue_date) = &tdr.issue_date {
            println!("  Issued:         {issue_date}");
        }
        if let Some(expiry_date) = &tdr.expiry_date {
            println!("  Expires:        {expiry_date}");
        }
        for transfer in &tdr.transfer_history {
            println!(
                "  -> {} ({}): {} units, {} [{}]",
                transfer.to_land_id,
                transfer.to_owner,
                transfer.units_transferred,
                transfer.year,
                transfer.certificate_number
            );
        }
    }

    Ok(())
}

fn handle_add(store: &mut LandRecordStore, cmd: &AddCommand) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("failed to read {}", cmd.file.display()))?;
    let mut record: LandRecord = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid land record", cmd.file.display()))?;

    if record.created_at.is_none() {
        record.created_at = Some(chrono::Local::now().format("%Y-%m-%d").to_string());
    }

    let land_id = record.land_id.clone();
    store
        .add_record(record)
        .with_context(|| format!("failed to add record {land_id}"))?;

    println!("Land record {land_id} added successfully.");
    Ok(())
}

fn handle_stats(store: &LandRecordStore, config: &Config, cmd: &StatsCommand) -> anyhow::Result<()> {
    let stats = DashboardStats::from_records(store.records());
    let recent = recent_records(store.records(), config.display.recent_limit);

    if cmd.json {
        let recent_json: Vec<_> = recent
            .iter()
            .map(|r| {
                serde_json::json!({
                    "landId": r.record.land_id,
                    "currentOwner": r.record.current_owner,
                    "village": r.record.village,
                    "pendingDisputes": r.pending_disputes,
                    "badge": RecordBadge::for_record(r.record),
                })
            })
            .collect();
        let output = serde_json::json!({ "stats": stats, "recent": recent_json });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Dashboard");
    println!("---------");
    println!("Total records:      {}", stats.total_records);
    println!("Total disputes:     {}", stats.total_disputes);
    println!("Resolved disputes:  {}", stats.resolved_disputes);
    println!("Pending disputes:   {}", stats.pending_disputes);
    println!();
    println!("Recent records");
    for r in &recent {
        println!(
            "  {:<17} {:<22} {:<26} pending disputes: {}",
            r.record.land_id, r.record.current_owner, r.record.village, r.pending_disputes
        );
    }
    Ok(())
}

fn handle_map(store: &LandRecordStore, cmd: &MapCommand) -> anyhow::Result<()> {
    let mapped = mapped_records(store.records());

    match cmd.format {
        OutputFormat::Json => {
            let points: Vec<_> = mapped
                .iter()
                .map(|(record, coords)| {
                    serde_json::json!({
                        "landId": record.land_id,
                        "village": record.village,
                        "coordinates": coords,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
        OutputFormat::Table => {
            println!("{:<17} {:>11} {:>11}  {}", "LAND ID", "LATITUDE", "LONGITUDE", "VILLAGE");
            for (record, coords) in &mapped {
                println!(
                    "{:<17} {:>11.6} {:>11.6}  {}",
                    record.land_id, coords.latitude, coords.longitude, record.village
                );
            }
        }
        OutputFormat::Plain => {
            for (record, coords) in &mapped {
                println!(
                    "{} {:.6},{:.6}",
                    record.land_id, coords.latitude, coords.longitude
                );
            }
        }
    }
    Ok(())
}

fn handle_convert(config: &Config, cmd: &ConvertCommand) -> anyhow::Result<()> {
    let results = units::convert(cmd.value, cmd.unit);
    if results.is_empty() {
        bail!("area must be a positive number, got {}", cmd.value);
    }

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!(
        "{} {} equals:",
        format_area(cmd.value, config),
        cmd.unit.label()
    );
    for (unit, value) in &results {
        println!("  {:>18}  {}", format_area(*value, config), unit.label());
    }
    Ok(())
}

fn handle_units() {
    println!("{:<18} {:>12}  {}", "KEY", "M² PER UNIT", "NAME");
    for unit in &UNIT_TABLE {
        println!("{:<18} {:>12}  {}", unit.key, unit.sq_meters, unit.label);
    }
}

fn handle_export(store: &LandRecordStore, config: &Config, cmd: &ExportCommand) -> anyhow::Result<()> {
    let record = find_record(store, &cmd.land_id)?;
    let dir = cmd.output.clone().unwrap_or_else(|| config.download_dir());
    let path = export::write_export(record, &dir)
        .with_context(|| format!("failed to export record {}", record.land_id))?;
    println!("Exported {} to {}", record.land_id, path.display());
    Ok(())
}

fn handle_fetch_doc(
    store: &LandRecordStore,
    config: &Config,
    cmd: &FetchDocCommand,
) -> anyhow::Result<()> {
    let record = find_record(store, &cmd.land_id)?;
    let Some(doc) = record.documents.iter().find(|d| d.name == cmd.name) else {
        let names: Vec<_> = record.documents.iter().map(|d| d.name.as_str()).collect();
        bail!(
            "record {} has no document named \"{}\" (available: {})",
            record.land_id,
            cmd.name,
            if names.is_empty() { "none".to_string() } else { names.join(", ") }
        );
    };

    let source = LocalDocumentSource::new(config.documents.root.clone());
    let dir = cmd.output.clone().unwrap_or_else(|| config.download_dir());
    match documents::retrieve(&source, doc, &dir)? {
        FetchOutcome::Saved { path, bytes } => {
            println!("Saved \"{}\" ({bytes} bytes) to {}", doc.name, path.display());
        }
        FetchOutcome::OpenDirect { link } => {
            println!("Could not download \"{}\". Open it directly: {link}", doc.name);
        }
    }
    Ok(())
}

fn handle_status(store: &LandRecordStore, json: bool) -> anyhow::Result<()> {
    let storage = store.backend();
    let slot = storage.slot_info(store.slot_key())?;
    let db_bytes = storage.db_size_bytes();

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "database_bytes": db_bytes,
            "slot_key": store.slot_key(),
            "slot_bytes": slot.as_ref().map(|s| s.bytes),
            "last_write": slot.as_ref().and_then(|s| s.updated_at).map(|t| t.to_rfc3339()),
            "state": store.state().to_string(),
            "records": store.len(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("bhumi status");
    println!("------------");
    println!("Database:      {}", storage.path().display());
    println!("Size:          {}", format_bytes(db_bytes));
    println!("Slot:          {}", store.slot_key());
    println!("State:         {}", store.state());
    println!("Records:       {}", store.len());
    match &slot {
        Some(info) => {
            println!("Snapshot size: {}", format_bytes(info.bytes));
            match info.updated_at {
                Some(at) => println!("Last write:    {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
                None => println!("Last write:    unknown"),
            }
        }
        None => println!("Snapshot:      not written yet"),
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path).context("failed to load configuration")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print_config(&config);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            if !path.exists() {
                println!("(file not found, defaults and environment only)");
            }
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_config(config: &Config) {
    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("[Storage]");
    println!("  Database path:        {}", config.database_path().display());
    println!("  Slot key:             {}", config.storage.slot_key);
    println!();
    println!("[Records]");
    println!("  Seed on empty:        {}", config.records.seed_on_empty);
    println!("  Reject duplicate ids: {}", config.records.reject_duplicate_ids);
    println!(
        "  Land id pattern:      {}",
        config.records.land_id_pattern.as_deref().unwrap_or("(any)")
    );
    println!();
    println!("[Documents]");
    println!(
        "  Root:                 {}",
        config
            .documents
            .root
            .as_deref()
            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
    );
    println!("  Download dir:         {}", config.download_dir().display());
    println!();
    println!("[Display]");
    println!("  Decimals:             {}", config.display.decimals);
    println!("  Recent limit:         {}", config.display.recent_limit);
}

fn format_area(value: f64, config: &Config) -> String {
    format!("{value:.prec$}", prec = config.display.decimals)
}

#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

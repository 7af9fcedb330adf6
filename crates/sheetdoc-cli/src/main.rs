//! sheetdoc CLI - fill DOCX templates from XLSX workbooks

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use sheetdoc::prelude::*;
use sheetdoc::find_all_placeholders;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetdoc")]
#[command(
    author,
    version,
    about = "Fill DOCX templates with values and tables from XLSX workbooks"
)]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template with values from a workbook
    Render {
        /// DOCX template with {{TAG}} placeholders
        #[arg(short, long)]
        template: PathBuf,

        /// XLSX workbook
        #[arg(short, long)]
        workbook: PathBuf,

        /// Mapping JSON, as a file path or inline
        #[arg(short, long)]
        mapping: Option<String>,

        /// Sheet used when an entry names none
        #[arg(short, long)]
        sheet: Option<String>,

        /// Extra table entry, TAG=RANGE or TAG=RANGE@SHEET
        #[arg(long = "table", value_parser = parse_table_field)]
        tables: Vec<TableField>,

        /// Leave no diagnostic paragraph for tags missing from the template
        #[arg(long)]
        skip_missing: bool,

        /// Match mapping keys as written instead of as {{KEY}}
        #[arg(long)]
        literal_keys: bool,

        /// Output DOCX file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the placeholders found in a template
    Tags {
        /// DOCX template
        template: PathBuf,
    },

    /// Show the sheets of a workbook and the used size of one of them
    Inspect {
        /// XLSX workbook
        workbook: PathBuf,

        /// Sheet to measure (default: the active sheet)
        #[arg(short, long)]
        sheet: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Render {
            template,
            workbook,
            mapping,
            sheet,
            tables,
            skip_missing,
            literal_keys,
            output,
        } => {
            let mut options = RenderOptions::default().with_wrap_bare_tags(!literal_keys);
            if let Some(sheet) = sheet {
                options = options.with_default_sheet(sheet);
            }
            if skip_missing {
                options = options.with_missing_tag(MissingTagPolicy::Skip);
            }
            render(
                DocumentAssembler::new(options),
                &template,
                &workbook,
                mapping.as_deref(),
                &tables,
                &output,
            )
        }
        Commands::Tags { template } => list_tags(&template),
        Commands::Inspect { workbook, sheet } => inspect(&workbook, sheet.as_deref()),
    }
}

/// `TAG=RANGE[@SHEET]`
fn parse_table_field(arg: &str) -> std::result::Result<TableField, String> {
    let (tag, rest) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=RANGE[@SHEET], got '{}'", arg))?;
    let (range, sheet) = match rest.split_once('@') {
        Some((range, sheet)) => (range, Some(sheet.to_string())),
        None => (rest, None),
    };
    if tag.trim().is_empty() {
        return Err(format!("missing tag in '{}'", arg));
    }
    Ok(TableField {
        tag: tag.trim().to_string(),
        range: range.trim().to_string(),
        sheet,
    })
}

fn load_mapping(assembler: &DocumentAssembler, mapping: Option<&str>) -> Result<MappingSet> {
    let json = match mapping {
        None => "{}".to_string(),
        Some(inline) if inline.trim_start().starts_with('{') => inline.to_string(),
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mapping '{}'", path))?,
    };
    assembler.parse_mapping(&json).context("Invalid mapping")
}

fn render(
    assembler: DocumentAssembler,
    template: &Path,
    workbook: &Path,
    mapping: Option<&str>,
    tables: &[TableField],
    output: &Path,
) -> Result<()> {
    let mut mapping = load_mapping(&assembler, mapping)?;
    mapping
        .merge_table_fields(tables, assembler.options().default_sheet.as_deref())
        .context("Invalid --table entry")?;
    if mapping.is_empty() {
        bail!("Nothing to render: give --mapping or at least one --table");
    }

    let template_bytes = std::fs::read(template)
        .with_context(|| format!("Failed to read '{}'", template.display()))?;
    let workbook_bytes = std::fs::read(workbook)
        .with_context(|| format!("Failed to read '{}'", workbook.display()))?;

    let (bytes, report) = assembler
        .render_with_report(&template_bytes, &workbook_bytes, &mapping)
        .context("Render failed")?;

    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;
    info!("wrote {} bytes to {}", bytes.len(), output.display());

    for (tag, outcome) in &report.outcomes {
        eprintln!("{}\t{}", tag, outcome);
    }
    eprintln!(
        "Wrote '{}' ({} of {} entries failed)",
        output.display(),
        report.failures().count(),
        report.outcomes.len()
    );
    Ok(())
}

fn list_tags(template: &Path) -> Result<()> {
    let package = DocxPackage::read_file(template)
        .with_context(|| format!("Failed to open '{}'", template.display()))?;

    for tag in find_all_placeholders(package.document()) {
        println!("{}", tag);
    }
    Ok(())
}

fn inspect(path: &Path, sheet: Option<&str>) -> Result<()> {
    let workbook = XlsxReader::read_file(path)
        .with_context(|| format!("Failed to open '{}'", path.display()))?;

    for (i, sheet) in workbook.worksheets().enumerate() {
        let marker = if i == workbook.active_sheet() { "*" } else { " " };
        let hidden = if sheet.is_visible() { "" } else { "\t(hidden)" };
        println!("{}{}\t{}{}", marker, i, sheet.name(), hidden);
    }

    let selected = match sheet {
        Some(name) => workbook
            .worksheet_by_name(name)
            .with_context(|| format!("Sheet '{}' not found", name))?,
        None => workbook
            .active_worksheet()
            .context("Workbook has no sheets")?,
    };

    println!();
    println!("Sheet: \"{}\"", selected.name());
    match selected.used_range() {
        Some(range) => println!(
            "Used range: {}:{} ({} rows x {} columns)",
            range.start,
            range.end,
            range.row_count(),
            range.col_count()
        ),
        None => println!("Used range: empty"),
    }
    Ok(())
}

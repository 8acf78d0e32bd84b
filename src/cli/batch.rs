use crate::batch::{self, Outcome, Report, Unit};
use crate::isa::Schema;
use ansi_term::Color::{Green, Red};
use anyhow::{bail, Context};
use derive_more::Constructor;
use log::{debug, info};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Where a batch run reads its sources from and writes its translations to.
#[derive(Debug, Clone, Constructor)]
pub struct Layout {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub source_ext: String,
    pub output_ext: String,
}

#[derive(Debug, Constructor)]
struct UnitSrc {
    name: OsString,
    path: PathBuf,
}

impl UnitSrc {
    fn display_name(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }

    fn load(&self) -> anyhow::Result<Unit> {
        let source = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Could not read '{}'", self.path.display()))?;
        Ok(Unit::new(self.display_name(), source))
    }
}

impl Layout {
    fn output_path(&self, unit: &UnitSrc) -> PathBuf {
        let mut file_name = unit.name.clone();
        file_name.push(".");
        file_name.push(&self.output_ext);
        self.output_dir.join(file_name)
    }
}

fn find_file_unit(path: &Path, ext: &str) -> Option<UnitSrc> {
    if !path.extension().map_or(false, |e| e == ext) {
        return None;
    }

    Some(UnitSrc::new(path.file_stem()?.to_owned(), PathBuf::from(path)))
}

fn find_units(layout: &Layout) -> anyhow::Result<Vec<UnitSrc>> {
    let mut units = Vec::new();
    let entries = layout
        .source_dir
        .read_dir()
        .with_context(|| format!("Could not list '{}'", layout.source_dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(unit) = find_file_unit(&path, &layout.source_ext) {
            units.push(unit);
        }
    }

    units.sort_unstable_by(|unit1, unit2| unit1.name.cmp(&unit2.name));
    Ok(units)
}

/// Translates every source file in `layout.source_dir`, writing one output file per
/// unit. Returns whether every unit was encoded.
///
/// A missing source or output directory fails the run before anything is written.
/// Afterwards, a unit which cannot be read or written counts as failed, but the
/// remaining units are still processed.
pub fn run_batch(schema: &Schema, layout: &Layout) -> anyhow::Result<bool> {
    if !layout.source_dir.is_dir() {
        bail!(
            "Source directory '{}' does not exist",
            layout.source_dir.display()
        );
    }
    if !layout.output_dir.is_dir() {
        bail!(
            "Output directory '{}' does not exist",
            layout.output_dir.display()
        );
    }

    let srcs = find_units(layout)?;
    info!(
        "found {} '.{}' units in '{}'",
        srcs.len(),
        layout.source_ext,
        layout.source_dir.display()
    );

    let name_pad = srcs.iter().map(|src| src.name.len()).max().unwrap_or(0);
    println!(
        "Translating: '{}' ({} units)",
        layout.source_dir.display(),
        srcs.len()
    );
    println!("{:-<line_len$}", "", line_len = name_pad + 30);

    let mut passes = 0;
    for (num, src) in srcs.iter().enumerate() {
        let msg = match run_unit(schema, layout, src) {
            Ok(report) => {
                if report.outcome.is_encoded() {
                    passes += 1;
                }
                format_report(&report)
            }
            Err(err) => format!("{}:\n\t{:#}", Red.bold().paint("FAIL: IO ERROR"), err),
        };

        println!(
            "Unit {:2}: {}{} {}",
            num + 1,
            src.display_name(),
            " ".repeat(name_pad - src.name.len()),
            msg
        );
    }

    let success = passes == srcs.len();
    println!("{:-<line_len$}", "", line_len = name_pad + 30);
    println!(
        "Batch Result: {}, {}/{} units encoded",
        if success {
            Green.bold().paint("SUCCESS")
        } else {
            Red.bold().paint("FAILED")
        },
        passes,
        srcs.len()
    );

    Ok(success)
}

fn run_unit(schema: &Schema, layout: &Layout, src: &UnitSrc) -> anyhow::Result<Report> {
    let unit = src.load()?;
    let report = batch::assemble_unit(schema, &unit);

    let out_path = layout.output_path(src);
    std::fs::write(&out_path, report.outcome.render())
        .with_context(|| format!("Could not write '{}'", out_path.display()))?;
    debug!("wrote '{}'", out_path.display());

    Ok(report)
}

fn format_report(report: &Report) -> String {
    match &report.outcome {
        Outcome::Encoded(insts) => format!(
            "{} {:5} instructions",
            Green.bold().paint("PASS"),
            insts.len()
        ),
        Outcome::Rejected(rejected) => format!(
            "{}:\n\t{}",
            Red.bold().paint("FAIL: FORMATTING ERROR"),
            rejected.to_string().replace("\n", "\n\t")
        ),
    }
}

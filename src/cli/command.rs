use super::batch::{self, Layout};
use crate::assembler::{self, disasm};
use crate::isa::Schema;
use ansi_term::Color::{Green, Red};
use anyhow::{anyhow, Context};
use log::info;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

pub const DEFAULT_OUTPUT_EXT: &str = "asm";

#[cfg(windows)]
pub fn terminal_init() {
    ansi_term::enable_ansi_support().expect("Could enable terminal ANSI support");
    logger_init();
}

#[cfg(not(windows))]
pub fn terminal_init() {
    logger_init();
}

fn logger_init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

#[derive(StructOpt, Debug)]
#[structopt(name = "asm16")]
pub enum CommandRoot {
    /// Assemble a single source file
    Asm(SubcommandAsm),
    /// Validate a source file without writing any output
    Check(SubcommandCheck),
    /// Decode a listing of binary instructions back into source
    Disasm(SubcommandDisasm),
    /// Assemble every source file in a directory
    Batch(SubcommandBatch),
}

#[derive(StructOpt, Debug)]
pub struct SchemaOpts {
    /// Instruction set table to use instead of the built-in one
    #[structopt(long, parse(from_os_str))]
    schema: Option<PathBuf>,
}

impl SchemaOpts {
    pub fn load(&self) -> anyhow::Result<Schema> {
        match &self.schema {
            None => Ok(Schema::builtin().clone()),
            Some(path) => {
                let src = read_source(path)?;
                let schema = Schema::parse(&src)
                    .map_err(|err| anyhow!("{}", err))
                    .with_context(|| format!("Invalid instruction set '{}'", path.display()))?;
                info!(
                    "loaded {} instruction definitions from '{}'",
                    schema.len(),
                    path.display()
                );
                Ok(schema)
            }
        }
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "asm16-asm")]
pub struct SubcommandAsm {
    #[structopt(flatten)]
    schema: SchemaOpts,

    #[structopt(name = "in.txt", parse(from_os_str))]
    in_src: PathBuf,

    #[structopt(name = "out.asm", parse(from_os_str))]
    out_bin: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandCheck {
    #[structopt(flatten)]
    schema: SchemaOpts,

    #[structopt(name = "in.txt", parse(from_os_str))]
    in_src: PathBuf,
}

#[derive(StructOpt, Debug)]
pub struct SubcommandDisasm {
    #[structopt(flatten)]
    schema: SchemaOpts,

    #[structopt(name = "in.asm", parse(from_os_str))]
    in_bin: PathBuf,
}

#[derive(StructOpt, Debug)]
#[structopt(name = "asm16-batch")]
pub struct SubcommandBatch {
    #[structopt(flatten)]
    schema: SchemaOpts,

    #[structopt(name = "source/dir", parse(from_os_str), default_value = "Compiler/Source")]
    source_dir: PathBuf,

    #[structopt(name = "output/dir", parse(from_os_str), default_value = "Compiler/Output")]
    output_dir: PathBuf,

    /// Extension of the source files to translate
    #[structopt(long, default_value = "txt")]
    source_ext: String,

    /// Extension given to each translated file
    #[structopt(long, default_value = "asm")]
    output_ext: String,
}

pub fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Could not read '{}'", path.display()))
}

fn print_rejection(path: &Path, rejected: &assembler::Rejected) {
    eprintln!("{} {}", Red.bold().paint("FAIL:"), path.display());
    for diag in rejected.diagnostics() {
        eprintln!("\t{}", diag);
    }
}

pub fn root(cmd: CommandRoot) -> ! {
    match cmd {
        CommandRoot::Asm(scmd) => asm(scmd),
        CommandRoot::Check(scmd) => check(scmd),
        CommandRoot::Disasm(scmd) => disasm(scmd),
        CommandRoot::Batch(scmd) => batch(scmd),
    };
}

fn exit_with(result: anyhow::Result<bool>) -> ! {
    match result {
        Ok(success) => std::process::exit(if success { 0 } else { 1 }),
        Err(err) => {
            eprintln!("{} {:#}", Red.bold().paint("error:"), err);
            std::process::exit(1)
        }
    }
}

fn default_out_path(in_src: &Path) -> PathBuf {
    PathBuf::from(in_src.file_stem().unwrap_or_else(|| in_src.as_os_str()))
        .with_extension(DEFAULT_OUTPUT_EXT)
}

pub fn asm(cmd: SubcommandAsm) -> ! {
    exit_with(run_asm(cmd))
}

pub fn check(cmd: SubcommandCheck) -> ! {
    exit_with(run_check(cmd))
}

pub fn disasm(cmd: SubcommandDisasm) -> ! {
    exit_with(run_disasm(cmd))
}

pub fn batch(cmd: SubcommandBatch) -> ! {
    exit_with(run_batch(cmd))
}

fn run_asm(cmd: SubcommandAsm) -> anyhow::Result<bool> {
    let SubcommandAsm {
        schema,
        in_src,
        out_bin,
    } = cmd;

    let schema = schema.load()?;
    let src = read_source(&in_src)?;

    let insts = match assembler::assemble(&schema, &src) {
        Ok(insts) => insts,
        Err(rejected) => {
            print_rejection(&in_src, &rejected);
            return Ok(false);
        }
    };

    let out_name = out_bin.unwrap_or_else(|| default_out_path(&in_src));
    std::fs::write(&out_name, assembler::render(&insts))
        .with_context(|| format!("Could not write '{}'", out_name.display()))?;
    info!("wrote {} instructions to '{}'", insts.len(), out_name.display());

    Ok(true)
}

fn run_check(cmd: SubcommandCheck) -> anyhow::Result<bool> {
    let schema = cmd.schema.load()?;
    let src = read_source(&cmd.in_src)?;

    match assembler::assemble(&schema, &src) {
        Err(rejected) => {
            print_rejection(&cmd.in_src, &rejected);
            Ok(false)
        }
        Ok(insts) => {
            println!(
                "{} {} ({} instructions)",
                Green.bold().paint("OK:"),
                cmd.in_src.display(),
                insts.len()
            );
            Ok(true)
        }
    }
}

fn run_disasm(cmd: SubcommandDisasm) -> anyhow::Result<bool> {
    let schema = cmd.schema.load()?;
    let src = read_source(&cmd.in_bin)?;

    let listing = disasm::disassemble(&schema, &src)
        .map_err(|err| anyhow!("{}", err))
        .with_context(|| format!("Could not disassemble '{}'", cmd.in_bin.display()))?;
    for inst in listing {
        println!("{}", inst);
    }

    Ok(true)
}

fn run_batch(cmd: SubcommandBatch) -> anyhow::Result<bool> {
    let schema = cmd.schema.load()?;
    batch::run_batch(
        &schema,
        &Layout::new(cmd.source_dir, cmd.output_dir, cmd.source_ext, cmd.output_ext),
    )
}

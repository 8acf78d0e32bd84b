use asm16::cli::command;
use structopt::StructOpt;

fn main() {
    command::terminal_init();
    command::batch(command::SubcommandBatch::from_args());
}

pub mod cli;

use colored::Colorize;

fn main() {
    let command_line_interface = cli::CommandLineInterface::load();
    wasm_schema_gen::logging::init_tracing(command_line_interface.verbose);
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

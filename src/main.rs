use std::process::ExitCode;

use json_digest::cli::CommandLineInterface;

fn main() -> ExitCode {
    let command_line_interface = CommandLineInterface::load();
    command_line_interface.init_logging();
    match command_line_interface.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

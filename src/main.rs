//!
//! `kora-emu`: boots a flat binary on the canonical Kora machine and runs it until it
//! executes ECALL or EBREAK (exit code 0) or faults (exit code 1).
//!

use kora_emu::config::Config;
use kora_emu::machine::Machine;
use owo_colors::OwoColorize;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match Config::get() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".bright_red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut machine = match Machine::new(&config) {
        Ok(machine) => machine,
        Err(e) => {
            eprintln!("{} couldn't boot `{}`: {}", "error:".bright_red().bold(), config.file, e);
            return ExitCode::FAILURE;
        }
    };

    let result = machine.run();
    let pc = machine.cpu().pc();

    let code = match result {
        Ok(halt) => {
            eprintln!("{halt} at PC {pc:#010x}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {}", "error:".bright_red().bold(), e);
            ExitCode::FAILURE
        }
    };

    if config.print_state {
        machine.cpu().print_state();
    }
    code
}

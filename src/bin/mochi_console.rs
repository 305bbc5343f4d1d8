//! Mochi Console demo
//!
//! Opens a console window and echoes every submitted line from a separate
//! reader thread.

use std::error::Error;
use std::thread;
use std::time::Duration;

use clap::Parser;
use mochi_console::color::{named, ANSI};
use mochi_console::{CliArgs, Config, Console, ConsoleHandle, ConsoleState};

fn run_reader(handle: ConsoleHandle) {
    let mut line = String::new();
    while handle.get_line_into(&mut line) >= 0 {
        match line.trim() {
            "" => {}
            "exit" | "quit" => handle.shutdown(),
            "clear" => handle.clear(),
            "help" => {
                handle.write_line("Commands: help, colors, clear, exit", Some(named::LIGHT_GRAY));
            }
            "colors" => {
                for (i, color) in ANSI.iter().enumerate() {
                    handle.write_line(&format!("color {:2} {}", i, color.to_hex()), Some(*color));
                }
            }
            other => {
                handle.write_line(&format!("echo: {}", other), None);
            }
        }
    }
    log::debug!("Reader thread finished");
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    log::debug!("Starting Mochi Console");

    let args = CliArgs::parse();

    let config = match Config::load_with_args(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let mut console = Console::new(config);
    console.init()?;

    let handle = console.handle();
    handle.write_line("Mochi Console. Type 'help' for commands.", Some(named::GOLD));
    let reader = thread::spawn(move || run_reader(handle));

    while console.state() == ConsoleState::Active {
        console.update();
        thread::sleep(Duration::from_millis(5));
    }

    console.destroy();
    if reader.join().is_err() {
        log::warn!("Reader thread panicked");
    }

    log::debug!("Mochi Console exited");
    Ok(())
}

//! Interactive REPL acting as a simulated device registry
//!
//! Lets you plug and unplug fake controllers and watch the slot table react
//! without any hardware attached.

use crate::reconciler::{ReconcileActorHandle, SlotSnapshot};
use crate::slots::SlotBinding;
use anyhow::Result;
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::runtime::Handle;

#[derive(Debug, Clone, PartialEq)]
enum ReplCommand {
    Connect { id: String, name: String },
    Disconnect(String),
    Show,
    Devices,
    Refresh,
    Export(String),
    Help,
    Quit,
}

fn parse_command(line: &str) -> std::result::Result<Option<ReplCommand>, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };

    let command = match verb {
        "connect" | "c" => {
            let id = parts.next().ok_or("usage: connect <id> [name...]")?;
            let name = parts.collect::<Vec<_>>().join(" ");
            ReplCommand::Connect {
                id: id.to_string(),
                name: if name.is_empty() { "Generic Gamepad".to_string() } else { name },
            }
        }
        "disconnect" | "d" => {
            let id = parts.next().ok_or("usage: disconnect <id>")?;
            ReplCommand::Disconnect(id.to_string())
        }
        "show" | "s" => ReplCommand::Show,
        "devices" => ReplCommand::Devices,
        "refresh" => ReplCommand::Refresh,
        "export" => {
            let path = parts.next().ok_or("usage: export <file.json>")?;
            ReplCommand::Export(path.to_string())
        }
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => return Err(format!("unknown command: {} (try 'help')", other)),
    };

    Ok(Some(command))
}

/// Run the REPL on the current (blocking) thread until `quit` or EOF
///
/// Must be called from outside the async runtime, e.g. via `spawn_blocking`.
/// Notifications go straight to the actor, so the slot table printed after
/// each command already reflects it.
pub fn run_repl(handle: ReconcileActorHandle, runtime: Handle) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    print_help();

    loop {
        let line = match rl.readline("padslots> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let _ = rl.add_history_entry(line.as_str());

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{}", message.red());
                continue;
            }
        };

        match command {
            ReplCommand::Connect { id, name } => {
                handle.on_device_connected(&id, name);
                print_slots(&runtime.block_on(handle.slots()));
            }
            ReplCommand::Disconnect(id) => {
                handle.on_device_disconnected(&id);
                print_slots(&runtime.block_on(handle.slots()));
            }
            ReplCommand::Show => print_slots(&runtime.block_on(handle.slots())),
            ReplCommand::Devices => {
                let devices = runtime.block_on(handle.connected());
                if devices.is_empty() {
                    println!("  {}", "(no devices connected)".dimmed());
                }
                for device in devices {
                    println!("  {} {}", device.device_id.yellow(), device.display_name);
                }
            }
            ReplCommand::Refresh => {
                handle.refresh();
                print_slots(&runtime.block_on(handle.slots()));
            }
            ReplCommand::Export(path) => {
                let snapshot = SlotSnapshot::new(runtime.block_on(handle.slots()));
                match runtime.block_on(snapshot.save_to_file(&path)) {
                    Ok(()) => println!("Exported {} slot(s) to {}", snapshot.bindings.len(), path.green()),
                    Err(e) => println!("{}", format!("Export failed: {:#}", e).red()),
                }
            }
            ReplCommand::Help => print_help(),
            ReplCommand::Quit => break,
        }
    }

    Ok(())
}

fn print_help() {
    println!("\n{}", "Simulated registry commands:".bold().cyan());
    println!("  connect <id> [name...]   plug in a controller (name picks defaults)");
    println!("  disconnect <id>          unplug a controller");
    println!("  show                     print the slot table");
    println!("  devices                  list connected devices");
    println!("  refresh                  run a pass without changes");
    println!("  export <file.json>       write the slot table to a file");
    println!("  quit\n");
}

fn print_slots(slots: &[SlotBinding]) {
    if slots.is_empty() {
        println!("  {}", "(no slots assigned)".dimmed());
        return;
    }

    for slot in slots {
        let led = match slot.led_color() {
            Some(argb) => format!("#{:06X}", argb & 0x00FF_FFFF).normal(),
            None => "off".dimmed(),
        };
        println!(
            "  {:<9} {:<24} {:<14} led {}",
            slot.player_label().bold(),
            slot.device_id.yellow(),
            format!("{:?}", slot.binding.controller_type()),
            led
        );
    }
}

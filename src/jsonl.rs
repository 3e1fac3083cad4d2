// JSONL command scripts

use crate::command::Command;
use eyre::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

/// Read a command script, one JSON command per line
///
/// Blank lines are ignored. Lines that can't be read or parsed are skipped
/// with a warning so one bad line doesn't abort the whole replay.
pub fn read_commands(path: &Path) -> Result<Vec<Command>> {
    let file = File::open(path).with_context(|| format!("Failed to open command script {}", path.display()))?;
    let commands = parse_commands(BufReader::new(file), path);

    info!(file = ?path, count = commands.len(), "Loaded command script");
    Ok(commands)
}

/// Parse commands from any buffered reader
///
/// `source` only labels warnings.
pub fn parse_commands<R: BufRead>(reader: R, source: &Path) -> Vec<Command> {
    let mut commands = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?source,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(&line) {
            Ok(command) => commands.push(command),
            Err(e) => {
                warn!(
                    file = ?source,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse command, skipping"
                );
            }
        }
    }

    commands
}

/// Write commands as a script, replacing any existing file
pub fn write_commands(path: &Path, commands: &[Command]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create command script {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for command in commands {
        let json = serde_json::to_string(command)?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()?;

    Ok(())
}

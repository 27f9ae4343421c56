//! The table outputter.

use super::{abs::Outputter, err};
use crate::{
    player::{Report, Status},
    score::{Frame, Performance},
};
use colored::Colorize;
use std::io::{self, Write};

/// An outputter that lays out each frame as a row of a table.
pub struct Table<W: Write> {
    w: tabwriter::TabWriter<W>,
}

impl<W: Write> Outputter for Table<W> {
    fn output(mut self: Box<Self>, p: Performance) -> err::Result<()> {
        self.dump_frames(&p.frames)?;
        writeln!(self.w)?;
        for report in &p.reports {
            self.dump_report(report)?;
        }
        self.w.flush()?;
        Ok(())
    }
}

impl<W: Write> Table<W> {
    /// Constructs a new table writer.
    pub fn new(writer: W) -> Self {
        Self {
            w: tabwriter::TabWriter::new(writer).padding(2),
        }
    }

    fn dump_frames(&mut self, frames: &[Frame]) -> io::Result<()> {
        let players: Vec<&String> = frames
            .first()
            .map(|f| f.transcripts.keys().collect())
            .unwrap_or_default();

        write!(self.w, "{}\t{}", "#".bold(), "checkpoint".bold())?;
        for player in &players {
            write!(self.w, "\t{}", player.bold())?;
        }
        writeln!(self.w)?;

        for (i, frame) in frames.iter().enumerate() {
            write!(self.w, "{}\t{}", i + 1, frame.checkpoint.to_string().cyan())?;
            for player in &players {
                let steps = frame.transcripts.get(*player).map_or(&[][..], Vec::as_slice);
                write!(self.w, "\t{}", stringify_steps(steps))?;
            }
            writeln!(self.w)?;
        }
        Ok(())
    }

    fn dump_report(&mut self, report: &Report) -> io::Result<()> {
        writeln!(
            self.w,
            "{sigil}\t{player}\t{status}",
            sigil = status_sigil(&report.status),
            player = report.player,
            status = report.status,
        )?;
        for cp in &report.missed {
            writeln!(self.w, "\t\t{} {}", "missed".yellow(), cp)?;
        }
        Ok(())
    }
}

fn status_sigil(status: &Status) -> colored::ColoredString {
    match status {
        Status::Finished => "*".green(),
        Status::Panicked(_) => "!".red(),
        Status::Idle => "-".yellow(),
    }
}

/// Converts a transcript to a string.
fn stringify_steps(steps: &[String]) -> String {
    if steps.is_empty() {
        "-".to_owned()
    } else {
        steps.join(",")
    }
}

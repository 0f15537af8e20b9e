use std::io::Write;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use tabwriter::TabWriter;

use crate::reconcile::OrphanResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable table per namespace
    #[default]
    Table,
    /// One JSON object per namespace per line
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    namespace: &'a str,
    orphaned: &'a [String],
}

#[derive(Serialize)]
struct JsonFailure<'a> {
    namespace: &'a str,
    error: String,
}

/// Formats per-namespace results. Each call returns one complete block, so
/// output for different namespaces never interleaves.
#[derive(Debug, Clone)]
pub struct Reporter {
    format: OutputFormat,
    color: bool,
}

impl Reporter {
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Reporter { format, color }
    }

    pub fn render(&self, namespace: &str, result: &OrphanResult) -> anyhow::Result<String> {
        match self.format {
            OutputFormat::Table => self.render_table(namespace, result),
            OutputFormat::Json => {
                let report = JsonReport {
                    namespace,
                    orphaned: result.names(),
                };
                let mut line = serde_json::to_string(&report)?;
                line.push('\n');
                Ok(line)
            }
        }
    }

    pub fn render_failure(&self, namespace: &str, err: &anyhow::Error) -> anyhow::Result<String> {
        match self.format {
            OutputFormat::Table => {
                let line = format!("Failed to audit namespace {}: {:#}", namespace, err);
                let line = if self.color {
                    line.red().to_string()
                } else {
                    line
                };
                Ok(format!("{}\n\n", line))
            }
            OutputFormat::Json => {
                let failure = JsonFailure {
                    namespace,
                    error: format!("{:#}", err),
                };
                let mut line = serde_json::to_string(&failure)?;
                line.push('\n');
                Ok(line)
            }
        }
    }

    fn render_table(&self, namespace: &str, result: &OrphanResult) -> anyhow::Result<String> {
        if result.is_empty() {
            let line = format!("No unused ConfigMaps found in namespace: {}", namespace);
            let line = if self.color {
                line.green().to_string()
            } else {
                line
            };
            return Ok(format!("{}\n\n", line));
        }

        let title = format!("Unused ConfigMaps in namespace: {}", namespace);
        let title = if self.color {
            title.bold().to_string()
        } else {
            title
        };

        let mut tw = TabWriter::new(Vec::new()).minwidth(0).padding(2);
        writeln!(tw, "#\tConfigMap Name")?;
        for (i, name) in result.names().iter().enumerate() {
            writeln!(tw, "{}\t{}", i + 1, name)?;
        }
        let table = tw.into_inner().context("when flushing table")?;
        let table = String::from_utf8(table).context("table was not valid utf8")?;

        Ok(format!("{}\n{}\n", title, table))
    }
}

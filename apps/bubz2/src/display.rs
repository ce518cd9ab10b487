//! Output rendering and formatting

use bubz2_ops::{OperationResult, SyncReport};
use bubz2_types::ColorChoice;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Whether color escapes should be written
    pub fn colors_enabled(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            self.render_table(result)
        }
    }

    /// Render as JSON
    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = result.to_json().map_err(io::Error::other)?;
        self.term.write_line(&json)
    }

    /// Render as formatted table
    fn render_table(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::SyncReport(report) => self.render_sync_report(report),
        }
    }

    fn render_sync_report(&self, report: &SyncReport) -> io::Result<()> {
        if report.compressed.is_empty() && report.failed.is_empty() {
            let message = format!(
                "Everything up to date ({} files, {} ignored)",
                report.up_to_date, report.ignored
            );
            return self.render_success_message(&message);
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.colors_enabled() {
            table.force_no_tty();
        }

        table.set_header(vec![
            Cell::new("Scanned").add_attribute(Attribute::Bold),
            Cell::new("Ignored").add_attribute(Attribute::Bold),
            Cell::new("Up to date").add_attribute(Attribute::Bold),
            Cell::new(if report.dry_run {
                "To compress"
            } else {
                "Compressed"
            })
            .add_attribute(Attribute::Bold),
            Cell::new("Failed").add_attribute(Attribute::Bold),
            Cell::new("Size").add_attribute(Attribute::Bold),
        ]);

        let failed_cell = if report.failed.is_empty() {
            Cell::new("0")
        } else {
            Cell::new(report.failed.len()).fg(Color::Red)
        };
        let size = if report.dry_run {
            format_size(report.bytes_in())
        } else {
            format!(
                "{} -> {}",
                format_size(report.bytes_in()),
                format_size(report.bytes_out())
            )
        };

        table.add_row(vec![
            Cell::new(report.scanned),
            Cell::new(report.ignored),
            Cell::new(report.up_to_date),
            Cell::new(report.compressed.len()).fg(Color::Green),
            failed_cell,
            Cell::new(size),
        ]);

        // Failed files were already reported on stderr as they happened
        self.term.write_line(&table.to_string())?;

        let footer = if report.dry_run {
            "Dry run, nothing was written".to_string()
        } else {
            format!("Finished in {}ms", report.duration_ms)
        };
        self.term
            .write_line(&self.style(Style::new().dim()).apply_to(footer).to_string())
    }

    fn render_success_message(&self, message: &str) -> io::Result<()> {
        let style = self.style(Style::new().green().bold());
        self.term
            .write_line(&format!("{} {message}", style.apply_to("OK")))
    }

    fn style(&self, style: Style) -> Style {
        if self.colors_enabled() {
            style.force_styling(true)
        } else {
            style.force_styling(false)
        }
    }
}

/// Human readable byte count
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

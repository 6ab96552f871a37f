//! Delimited text tables
//!
//! Reads EDS exports (one particle per line, header first) and writes the
//! classified output. Cells are kept as text until a numeric view is asked
//! for, so identifier columns can be copied to the output unchanged.

use std::fmt::Write as _;
use std::path::Path;

use tracing::{debug, info};

use crate::config::{defaults, ClassifierConfig};
use crate::dispatch::SchemeOutput;
use crate::error::ClassifyError;
use crate::ratios::RatioTable;
use crate::types::ElementTable;

// ============================================================================
// Reading
// ============================================================================

/// Split one record on `delimiter`, honouring double quotes.
///
/// `""` inside a quoted field is a literal quote.
pub fn split_record(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == delimiter && !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Numeric value of a cell. Blank, `NaN`, `null`, `-` and non-numeric text
/// are NaN.
pub fn parse_cell(cell: &str) -> f64 {
    let s = cell.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("null") || s == "-" {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// A delimited table held as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    header: Vec<String>,
    records: Vec<Vec<String>>,
}

impl RawTable {
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    pub fn n_rows(&self) -> usize {
        self.records.len()
    }

    /// Numeric view of every column.
    pub fn to_element_table(&self) -> Result<ElementTable, ClassifyError> {
        let rows = self
            .records
            .iter()
            .map(|record| record.iter().map(|c| parse_cell(c)).collect())
            .collect();
        ElementTable::new(self.header.clone(), rows)
            .map_err(|e| ClassifyError::NotTabular(e.to_string()))
    }
}

/// Parse delimited text. The first non-blank line is the header; blank
/// lines are skipped. A leading UTF-8 byte order mark is dropped.
pub fn parse_table(text: &str, delimiter: char) -> Result<RawTable, ClassifyError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header_line) = lines
        .next()
        .ok_or_else(|| ClassifyError::NotTabular("no header line".to_string()))?;
    let header: Vec<String> = split_record(header_line, delimiter)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (line_num, line) in lines {
        let record = split_record(line, delimiter);
        if record.len() != header.len() {
            return Err(ClassifyError::Csv {
                line: line_num,
                message: format!(
                    "{} fields, header has {}",
                    record.len(),
                    header.len()
                ),
            });
        }
        records.push(record);
    }

    debug!(columns = header.len(), rows = records.len(), "Parsed table");
    Ok(RawTable { header, records })
}

/// Read and parse a delimited file.
pub fn read_table(path: &Path, delimiter: char) -> Result<RawTable, ClassifyError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ClassifyError::Io(path.to_path_buf(), e))?;
    let table = parse_table(&text, delimiter)?;
    info!(
        file = %path.display(),
        columns = table.header.len(),
        rows = table.n_rows(),
        "Table loaded"
    );
    Ok(table)
}

// ============================================================================
// Writing
// ============================================================================

/// Which columns the output table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub delimiter: char,
    pub include_group: bool,
    pub include_refractive_index: bool,
    pub keep_input_columns: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::from(&ClassifierConfig::default())
    }
}

impl From<&ClassifierConfig> for OutputOptions {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            delimiter: config.delimiter(),
            include_group: config.output.include_group,
            include_refractive_index: config.output.include_refractive_index,
            keep_input_columns: config.output.keep_input_columns,
        }
    }
}

fn quote_field(field: &str, delimiter: char) -> String {
    if field.contains(delimiter) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_record(out: &mut String, fields: &[String], delimiter: char) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(delimiter);
        }
        out.push_str(&quote_field(field, delimiter));
        first = false;
    }
    out.push('\n');
}

/// Label columns of one output row, in header order.
fn output_columns(output: &SchemeOutput, options: OutputOptions) -> Vec<&'static str> {
    let mut columns = vec![defaults::CLASS_COLUMN];
    match output {
        SchemeOutput::Donarummo(_) | SchemeOutput::Panta(_) => {}
        SchemeOutput::Kandler(_) => {
            if options.include_group {
                columns.push(defaults::GROUP_COLUMN);
            }
            if options.include_refractive_index {
                columns.push(defaults::REFRACTIVE_INDEX_COLUMN);
            }
        }
        SchemeOutput::Ml(_) => {
            if options.include_group {
                columns.push(defaults::GROUP_COLUMN);
            }
            columns.push(defaults::CONFIDENCE_COLUMN);
        }
    }
    columns
}

fn output_cells(output: &SchemeOutput, row: usize, options: OutputOptions) -> Vec<String> {
    match output {
        SchemeOutput::Donarummo(v) => vec![v[row].to_string()],
        SchemeOutput::Panta(v) => vec![v[row].to_string()],
        SchemeOutput::Kandler(v) => {
            let record = &v[row];
            let mut cells = vec![record.class.to_string()];
            if options.include_group {
                cells.push(record.group.to_string());
            }
            if options.include_refractive_index {
                cells.push(record.refractive_index.to_string());
            }
            cells
        }
        SchemeOutput::Ml(v) => {
            let record = &v[row];
            let mut cells = vec![record.label.clone()];
            if options.include_group {
                cells.push(record.group.clone());
            }
            cells.push(format!("{:.4}", record.confidence));
            cells
        }
    }
}

/// Render the classification as delimited text.
///
/// With `keep_input_columns`, `input` must be the table that was classified.
pub fn render_output(
    input: Option<&RawTable>,
    output: &SchemeOutput,
    options: OutputOptions,
) -> Result<String, ClassifyError> {
    let passthrough = match (options.keep_input_columns, input) {
        (true, Some(table)) if table.n_rows() == output.len() => Some(table),
        (true, Some(table)) => {
            return Err(ClassifyError::NotTabular(format!(
                "input has {} rows, output has {}",
                table.n_rows(),
                output.len()
            )))
        }
        (true, None) => {
            return Err(ClassifyError::NotTabular(
                "keep_input_columns needs the input table".to_string(),
            ))
        }
        (false, _) => None,
    };

    let mut header: Vec<String> = passthrough
        .map(|t| t.header.clone())
        .unwrap_or_default();
    header.extend(output_columns(output, options).iter().map(|c| (*c).to_string()));

    let mut out = String::new();
    push_record(&mut out, &header, options.delimiter);
    for row in 0..output.len() {
        let mut cells = passthrough
            .map(|t| t.records[row].clone())
            .unwrap_or_default();
        cells.extend(output_cells(output, row, options));
        push_record(&mut out, &cells, options.delimiter);
    }
    Ok(out)
}

/// Render a ratio table; non-finite values print as `NaN` / `inf`.
pub fn render_ratios(ratios: &RatioTable, delimiter: char) -> String {
    let header: Vec<String> = ratios.names().iter().map(|n| (*n).to_string()).collect();
    let mut out = String::new();
    push_record(&mut out, &header, delimiter);
    for row in ratios.rows() {
        let mut line = String::new();
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                line.push(delimiter);
            }
            let _ = write!(line, "{value}");
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Write text to `path`.
pub fn write_text(path: &Path, text: &str) -> Result<(), ClassifyError> {
    std::fs::write(path, text).map_err(|e| ClassifyError::Io(path.to_path_buf(), e))?;
    info!(file = %path.display(), bytes = text.len(), "Output written");
    Ok(())
}

// mod.rs - Output formatters module

use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::core::{SaturationPolicy, StreamResult};
use crate::error::Result;

/// Digits after the decimal point unless configured otherwise
pub const DEFAULT_PRECISION: usize = 4;

/// Supported matrix layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Phylip,
    Tsv,
    Csv,
    Nexus,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "phylip" => Ok(OutputFormat::Phylip),
            "tsv" => Ok(OutputFormat::Tsv),
            "csv" => Ok(OutputFormat::Csv),
            "nexus" => Ok(OutputFormat::Nexus),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unsupported output format: {}. Use: phylip, tsv, csv, nexus, json",
                s
            )),
        }
    }
}

/// C-style scientific notation: `3.0410e-01`, `0.0000e+00`
pub fn format_scientific(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rust = format!("{:.*e}", precision, value);
    let Some((mantissa, exponent)) = rust.split_once('e') else {
        return rust;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exponent.abs())
}

fn header_lines(command_line: &str) -> [String; 3] {
    [
        format!("Command: {}", command_line),
        format!(
            "Generated: {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ),
        format!("mafdist v{}", env!("CARGO_PKG_VERSION")),
    ]
}

/// Square PHYLIP matrix: count line, then `name value...` rows
pub fn write_phylip(
    writer: &mut dyn Write,
    names: &[String],
    rows: &[Vec<f64>],
    precision: usize,
) -> Result<()> {
    writeln!(writer, "{}", names.len())?;
    for (name, row) in names.iter().zip(rows) {
        write!(writer, "{:<10}", name)?;
        for &value in row {
            write!(writer, " {}", format_scientific(value, precision))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Labelled square matrix with `#` comment header, TSV or CSV
pub fn write_delimited(
    writer: &mut dyn Write,
    names: &[String],
    rows: &[Vec<f64>],
    precision: usize,
    delimiter: u8,
    command_line: &str,
) -> Result<()> {
    for line in header_lines(command_line) {
        writeln!(writer, "# {}", line)?;
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    let mut header = Vec::with_capacity(names.len() + 1);
    header.push("identity".to_string());
    header.extend(names.iter().cloned());
    csv_writer.write_record(&header)?;

    for (name, row) in names.iter().zip(rows) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(name.clone());
        record.extend(row.iter().map(|&v| format!("{:.*}", precision, v)));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// NEXUS DISTANCES block, lower triangle with diagonal
pub fn write_nexus(
    writer: &mut dyn Write,
    names: &[String],
    rows: &[Vec<f64>],
    precision: usize,
    command_line: &str,
) -> Result<()> {
    writeln!(writer, "#NEXUS")?;
    for line in header_lines(command_line) {
        writeln!(writer, "[{}]", line)?;
    }
    writeln!(writer, "BEGIN DISTANCES;")?;
    writeln!(writer, "    DIMENSIONS NTAX={};", names.len())?;
    writeln!(writer, "    FORMAT LABELS LOWER DIAGONAL;")?;
    writeln!(writer, "    MATRIX")?;
    for (i, (name, row)) in names.iter().zip(rows).enumerate() {
        write!(writer, "        {}", name)?;
        for &value in row.iter().take(i + 1) {
            write!(writer, " {:.*}", precision, value)?;
        }
        writeln!(writer)?;
    }
    writeln!(writer, "    ;")?;
    writeln!(writer, "END;")?;
    Ok(())
}

#[derive(Serialize)]
struct JsonPair<'a> {
    a: &'a str,
    b: &'a str,
    compared: u64,
    mismatches: u64,
    distance: f64,
}

#[derive(Serialize)]
struct JsonMatrix<'a> {
    identities: &'a [String],
    matrix: &'a [Vec<f64>],
    pairs: Vec<JsonPair<'a>>,
}

/// Identities, matrix and the raw per-pair counts as one JSON document
pub fn write_json(writer: &mut dyn Write, result: &StreamResult, rows: &[Vec<f64>]) -> Result<()> {
    let names = result.identities();
    let mut pairs = Vec::new();
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            let stat = result.matrix.stat(i, j);
            pairs.push(JsonPair {
                a: &names[i],
                b: &names[j],
                compared: stat.compared,
                mismatches: stat.mismatches,
                distance: rows[i][j],
            });
        }
    }
    let doc = JsonMatrix {
        identities: names,
        matrix: rows,
        pairs,
    };
    serde_json::to_writer_pretty(&mut *writer, &doc)?;
    writeln!(writer)?;
    Ok(())
}

/// Render one stream's matrix in `format`
pub fn write_matrix(
    writer: &mut dyn Write,
    format: OutputFormat,
    result: &StreamResult,
    policy: SaturationPolicy,
    precision: usize,
    command_line: &str,
) -> Result<()> {
    let rows = result.distances(policy)?;
    let names = result.identities();
    match format {
        OutputFormat::Phylip => write_phylip(writer, names, &rows, precision),
        OutputFormat::Tsv => write_delimited(writer, names, &rows, precision, b'\t', command_line),
        OutputFormat::Csv => write_delimited(writer, names, &rows, precision, b',', command_line),
        OutputFormat::Nexus => write_nexus(writer, names, &rows, precision, command_line),
        OutputFormat::Json => write_json(writer, result, &rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{process_stream, ComparisonKernel, PipelineOptions};
    use std::io::Cursor;

    fn example() -> StreamResult {
        let options = PipelineOptions {
            kernel: ComparisonKernel::Scalar,
            ..PipelineOptions::default()
        };
        process_stream(
            Cursor::new(b"##maf\na\ns X.1 0 4 + 4 ACGT\ns Y.1 0 4 + 4 ACGA\n".to_vec()),
            "test",
            &options,
        )
        .unwrap()
    }

    fn render(format: OutputFormat) -> String {
        let mut out = Vec::new();
        write_matrix(
            &mut out,
            format,
            &example(),
            SaturationPolicy::default(),
            DEFAULT_PRECISION,
            "mafdist test.maf",
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_scientific() {
        assert_eq!(format_scientific(0.0, 4), "0.0000e+00");
        assert_eq!(format_scientific(0.304098, 4), "3.0410e-01");
        assert_eq!(format_scientific(-1.0, 4), "-1.0000e+00");
        assert_eq!(format_scientific(1250.0, 2), "1.25e+03");
        assert_eq!(format_scientific(1e-123, 1), "1.0e-123");
    }

    #[test]
    fn test_phylip_layout() {
        let text = render(OutputFormat::Phylip);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "2");
        assert_eq!(lines[1], "X          0.0000e+00 3.0410e-01");
        assert_eq!(lines[2], "Y          3.0410e-01 0.0000e+00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_tsv_and_csv() {
        let tsv = render(OutputFormat::Tsv);
        let body: Vec<&str> = tsv.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(body[0], "identity\tX\tY");
        assert_eq!(body[1], "X\t0.0000\t0.3041");

        let csv = render(OutputFormat::Csv);
        assert!(csv.lines().any(|l| l == "Y,0.3041,0.0000"));
        assert!(csv.starts_with("# Command: mafdist test.maf"));
    }

    #[test]
    fn test_nexus_lower_triangle() {
        let nexus = render(OutputFormat::Nexus);
        assert!(nexus.starts_with("#NEXUS"));
        assert!(nexus.contains("DIMENSIONS NTAX=2;"));
        assert!(nexus.contains("        X 0.0000\n"));
        assert!(nexus.contains("        Y 0.3041 0.0000\n"));
    }

    #[test]
    fn test_json_document() {
        let json: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json)).unwrap();
        assert_eq!(json["identities"][1], "Y");
        assert_eq!(json["pairs"][0]["compared"], 4);
        assert_eq!(json["pairs"][0]["mismatches"], 1);
        assert_eq!(json["matrix"][0][0], 0.0);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PHYLIP".parse::<OutputFormat>().unwrap(), OutputFormat::Phylip);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}

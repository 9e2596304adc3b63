//! Grid connectivity files.
//!
//! Line-oriented, comma-separated text:
//!
//! ```text
//! #TempestGridConnectivityFileV2.0
//! <ndims>,<dim0>[,<dim1>]
//! <lonDeg>,<latDeg>,<area>,<degree>[,<nbr1>[,<nbr2>...]]
//! ...
//! ```
//!
//! One record per cell in flat order. Coordinates are stored in degrees and
//! neighbour indices are 1-based; in memory they are radians and 0-based.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::GridError;
use crate::grid::GridData;

/// First line of every connectivity file.
pub const FILE_IDENTIFIER: &str = "#TempestGridConnectivityFileV2.0";

/// Read a connectivity file.
pub fn read_connectivity_file(path: &Path) -> Result<GridData, GridError> {
    let file = File::open(path)?;
    let data = read_connectivity(BufReader::new(file))?;
    debug!(
        "Read {} cells (dims {:?}) from {}",
        data.lon.len(),
        data.dims,
        path.display()
    );
    Ok(data)
}

/// Parse connectivity data from a reader.
pub fn read_connectivity<R: BufRead>(reader: R) -> Result<GridData, GridError> {
    let mut lines = reader.lines();

    let tag = lines
        .next()
        .transpose()?
        .ok_or_else(|| GridError::format("Empty file"))?;
    // Only the first token is the tag; the rest of the line is free text.
    if tag.split_whitespace().next() != Some(FILE_IDENTIFIER) {
        return Err(GridError::format(format!(
            "Expected format tag \"{}\", found \"{}\"",
            FILE_IDENTIFIER,
            tag.trim()
        )));
    }

    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| GridError::format("Premature end of file (missing dimensions)"))?;
    let dims = parse_dims(&header)?;
    let n_cells = dims
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| {
            GridError::format(format!("Grid dimensions {:?} overflow the cell count", dims))
        })?;

    // Sizes come from an untrusted header, so grow as records arrive.
    let mut lon = Vec::new();
    let mut lat = Vec::new();
    let mut area = Vec::new();
    let mut connectivity = Vec::new();

    for cell in 0..n_cells {
        let line = lines.next().transpose()?.ok_or_else(|| {
            GridError::format(format!(
                "Premature end of file ({} of {} cells read)",
                cell, n_cells
            ))
        })?;
        let record = parse_record(&line, cell, n_cells)?;
        lon.push(record.lon_deg.to_radians());
        lat.push(record.lat_deg.to_radians());
        area.push(record.area);
        connectivity.push(record.neighbors);
    }

    Ok(GridData {
        dims,
        lon,
        lat,
        area: Some(area),
        connectivity,
    })
}

fn parse_dims(line: &str) -> Result<Vec<usize>, GridError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    let n_dims: usize = fields[0].parse().map_err(|_| {
        GridError::format(format!("Invalid dimension count \"{}\"", fields[0]))
    })?;
    if !(1..=2).contains(&n_dims) {
        return Err(GridError::format(format!(
            "{} dimensions out of range (expected 1 or 2)",
            n_dims
        )));
    }
    if fields.len() != n_dims + 1 {
        return Err(GridError::format(format!(
            "Dimension header lists {} sizes for {} dimensions",
            fields.len() - 1,
            n_dims
        )));
    }

    fields[1..]
        .iter()
        .enumerate()
        .map(|(d, f)| match f.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(GridError::format(format!(
                "Grid dimension {} out of range (\"{}\" found)",
                d, f
            ))),
        })
        .collect()
}

struct Record {
    lon_deg: f64,
    lat_deg: f64,
    area: f64,
    neighbors: Vec<usize>,
}

fn parse_record(line: &str, cell: usize, n_cells: usize) -> Result<Record, GridError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        return Err(GridError::format(format!(
            "Record for cell {} has {} fields (at least 4 expected)",
            cell,
            fields.len()
        )));
    }

    let number = |k: usize, what: &str| -> Result<f64, GridError> {
        fields[k].parse().map_err(|_| {
            GridError::format(format!(
                "Invalid {} \"{}\" in record for cell {}",
                what, fields[k], cell
            ))
        })
    };
    let lon_deg = number(0, "longitude")?;
    let lat_deg = number(1, "latitude")?;
    let area = number(2, "area")?;

    let degree: usize = fields[3].parse().map_err(|_| {
        GridError::format(format!(
            "Invalid neighbour count \"{}\" in record for cell {}",
            fields[3], cell
        ))
    })?;
    if fields.len() - 4 != degree {
        return Err(GridError::format(format!(
            "Record for cell {} lists {} neighbours but declares {}",
            cell,
            fields.len() - 4,
            degree
        )));
    }

    let neighbors = fields[4..]
        .iter()
        .map(|f| match f.parse::<usize>() {
            Ok(n) if (1..=n_cells).contains(&n) => Ok(n - 1),
            _ => Err(GridError::format(format!(
                "Invalid neighbour index \"{}\" in record for cell {}",
                f, cell
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Record {
        lon_deg,
        lat_deg,
        area,
        neighbors,
    })
}

/// Write a connectivity file.
pub fn write_connectivity_file(data: &GridData, path: &Path) -> Result<(), GridError> {
    check_consistent(data)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_connectivity(data, &mut writer)?;
    writer.flush()?;
    debug!(
        "Wrote {} cells (dims {:?}) to {}",
        data.lon.len(),
        data.dims,
        path.display()
    );
    Ok(())
}

/// Serialize connectivity data to a writer.
pub fn write_connectivity<W: Write>(data: &GridData, writer: &mut W) -> Result<(), GridError> {
    let area = check_consistent(data)?;

    writeln!(writer, "{}", FILE_IDENTIFIER)?;

    let dims: Vec<String> = data.dims.iter().map(|d| d.to_string()).collect();
    writeln!(writer, "{},{}", data.dims.len(), dims.join(","))?;

    for (cell, nbrs) in data.connectivity.iter().enumerate() {
        write!(
            writer,
            "{},{},{},{}",
            scientific(data.lon[cell].to_degrees()),
            scientific(data.lat[cell].to_degrees()),
            scientific(area[cell]),
            nbrs.len()
        )?;
        for &n in nbrs {
            write!(writer, ",{}", n + 1)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Check that every per-cell array matches the cell count implied by dims.
fn check_consistent(data: &GridData) -> Result<&[f64], GridError> {
    if !(1..=2).contains(&data.dims.len()) {
        return Err(GridError::precondition(format!(
            "Connectivity files hold 1 or 2 dimensions ({} given)",
            data.dims.len()
        )));
    }

    let n_cells = data.cell_count();
    let area = data.area.as_deref().unwrap_or(&[]);
    let lengths = [
        ("lon", data.lon.len()),
        ("lat", data.lat.len()),
        ("area", area.len()),
        ("connectivity", data.connectivity.len()),
    ];
    for (name, len) in lengths {
        if len != n_cells {
            return Err(GridError::internal(format!(
                "Mangled grid: {} has {} entries but dims {:?} imply {}",
                name, len, data.dims, n_cells
            )));
        }
    }
    Ok(area)
}

/// Format with 14 fractional digits and a signed exponent of at least two
/// digits, e.g. `-1.23450000000000e+02`.
fn scientific(value: f64) -> String {
    let s = format!("{:.14e}", value);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> GridData {
        GridData {
            dims: vec![3],
            lon: vec![0.0, 1.0, 2.0],
            lat: vec![-0.5, 0.0, 0.5],
            area: Some(vec![1.0, 2.0, 3.0]),
            connectivity: vec![vec![1], vec![0, 2], vec![]],
        }
    }

    fn to_text(data: &GridData) -> String {
        let mut buf = Vec::new();
        write_connectivity(data, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_scientific_format() {
        assert_eq!(scientific(123.45), "1.23450000000000e+02");
        assert_eq!(scientific(-0.00123), "-1.23000000000000e-03");
        assert_eq!(scientific(0.0), "0.00000000000000e+00");
        assert_eq!(scientific(1.5e-300), "1.50000000000000e-300");
    }

    #[test]
    fn test_write_layout() {
        let text = to_text(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], FILE_IDENTIFIER);
        assert_eq!(lines[1], "1,3");
        assert_eq!(lines.len(), 5);
        assert!(lines[2].ends_with(",1.00000000000000e+00,1,2"));
        assert!(lines[3].ends_with(",2,1,3"));
        assert!(lines[4].ends_with(",0"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_read_converts_units() {
        let text = format!(
            "{}\n2,1,2\n90.0,45.0,1.5,1,2\n180.0,-45.0,2.5,1,1",
            FILE_IDENTIFIER
        );
        let data = read_connectivity(Cursor::new(text)).unwrap();
        assert_eq!(data.dims, vec![1, 2]);
        assert!((data.lon[0] - std::f64::consts::FRAC_PI_2).abs() < 1e-15);
        assert!((data.lat[1] + std::f64::consts::FRAC_PI_4).abs() < 1e-15);
        assert_eq!(data.area, Some(vec![1.5, 2.5]));
        assert_eq!(data.connectivity, vec![vec![1], vec![0]]);
    }

    #[test]
    fn test_read_written_text() {
        let original = sample();
        let data = read_connectivity(Cursor::new(to_text(&original))).unwrap();
        assert_eq!(data.dims, original.dims);
        assert_eq!(data.connectivity, original.connectivity);
        for (a, b) in data.lon.iter().zip(&original.lon) {
            assert!((a - b).abs() < 1e-13);
        }
    }

    #[test]
    fn test_rejects_wrong_tag() {
        let text = "#TempestGridConnectivityFileV1.0\n1,1\n0,0,1,0\n";
        let err = read_connectivity(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, GridError::Format(_)));
    }

    #[test]
    fn test_tag_line_may_carry_trailing_text() {
        let text = format!("{} generated 2024-01-01\n1,1\n0,0,1,0\n", FILE_IDENTIFIER);
        let data = read_connectivity(Cursor::new(text)).unwrap();
        assert_eq!(data.dims, vec![1]);

        let glued = format!("{}x\n1,1\n0,0,1,0\n", FILE_IDENTIFIER);
        assert!(read_connectivity(Cursor::new(glued)).is_err());
    }

    #[test]
    fn test_overflowing_dims() {
        let text = format!("{}\n2,4294967296,4294967296\n0,0,1,0\n", FILE_IDENTIFIER);
        let err = read_connectivity(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, GridError::Format(_)));
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn test_huge_dims_hit_end_of_file() {
        let text = format!("{}\n1,100000000000000\n0,0,1,0\n", FILE_IDENTIFIER);
        let err = read_connectivity(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, GridError::Format(_)));
        assert!(err.to_string().contains("Premature end of file"));
    }

    #[test]
    fn test_rejects_bad_dims() {
        for header in ["3,1,1,1", "0", "1,0", "2,4", "x,1"] {
            let text = format!("{}\n{}\n", FILE_IDENTIFIER, header);
            let err = read_connectivity(Cursor::new(text)).unwrap_err();
            assert!(matches!(err, GridError::Format(_)), "header {}", header);
        }
    }

    #[test]
    fn test_truncated_file() {
        let text = format!("{}\n1,3\n0,0,1,0\n1,1,1,0\n", FILE_IDENTIFIER);
        let err = read_connectivity(Cursor::new(text)).unwrap_err();
        assert!(err.to_string().contains("Premature end of file"));
    }

    #[test]
    fn test_trailing_lines_ignored() {
        let text = format!("{}\n1,1\n0,0,1,0\nextra\n", FILE_IDENTIFIER);
        let data = read_connectivity(Cursor::new(text)).unwrap();
        assert_eq!(data.lon.len(), 1);
    }

    #[test]
    fn test_rejects_malformed_records() {
        for record in ["0,0,1", "0,0,1,2,1", "0,0,1,1,0", "a,0,1,0", "0,0,1,1,1,2"] {
            let text = format!("{}\n1,1\n{}\n", FILE_IDENTIFIER, record);
            let err = read_connectivity(Cursor::new(text)).unwrap_err();
            assert!(matches!(err, GridError::Format(_)), "record {}", record);
        }
    }

    #[test]
    fn test_rejects_neighbour_past_last_cell() {
        let text = format!(
            "{}\n1,3\n0,0,1,1,2\n1,1,1,1,99\n2,2,1,1,1\n",
            FILE_IDENTIFIER
        );
        let err = read_connectivity(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, GridError::Format(_)));
        assert!(err.to_string().contains("99"));

        let huge_degree = format!("{}\n1,1\n0,0,1,{}\n", FILE_IDENTIFIER, usize::MAX);
        let err = read_connectivity(Cursor::new(huge_degree)).unwrap_err();
        assert!(matches!(err, GridError::Format(_)));

        let last = format!("{}\n1,3\n0,0,1,1,3\n1,1,1,0\n2,2,1,1,1\n", FILE_IDENTIFIER);
        let data = read_connectivity(Cursor::new(last)).unwrap();
        assert_eq!(data.connectivity[0], vec![2]);
    }

    #[test]
    fn test_write_rejects_mangled_data() {
        let mut data = sample();
        data.lat.pop();
        let mut buf = Vec::new();
        assert!(matches!(
            write_connectivity(&data, &mut buf),
            Err(GridError::Internal(_))
        ));

        let mut data = sample();
        data.area = None;
        assert!(matches!(
            write_connectivity(&data, &mut buf),
            Err(GridError::Internal(_))
        ));
    }
}

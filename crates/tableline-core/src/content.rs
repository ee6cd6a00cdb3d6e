//! Content dataset decoding: `;`-delimited CSV → [`ContentRow`] (cuisine, ratings, style)

use std::io::Read;

use serde::Deserialize;

use crate::enums::PriceRange;
use crate::error::{PipelineError, Result};
use crate::record::{Content, ContentRow};

/// Field delimiter of the content dataset.
pub const DELIMITER: u8 = b';';

/// Declared columns, in the fixed order used when the file has no header.
pub const CONTENT_COLUMNS: [&str; 8] = [
    "objectID",
    "food_type",
    "stars_count",
    "reviews_count",
    "neighborhood",
    "phone_number",
    "price_range",
    "dining_style",
];

/// Column positions, one per entry of [`CONTENT_COLUMNS`].
type ColumnMap = [usize; 8];

const POSITIONAL: ColumnMap = [0, 1, 2, 3, 4, 5, 6, 7];

/// How to treat the first row of the content file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Header if the first row contains an `objectID` cell.
    #[default]
    Auto,
    Present,
    Absent,
}

impl std::fmt::Display for HeaderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

impl std::str::FromStr for HeaderMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(format!(
                "invalid header mode {other:?} (expected auto, present or absent)"
            )),
        }
    }
}

/// Locate each declared column by name in a header row.
fn map_header(header: &csv::StringRecord) -> Result<ColumnMap> {
    let mut map = POSITIONAL;
    for (slot, name) in map.iter_mut().zip(CONTENT_COLUMNS) {
        *slot = header
            .iter()
            .position(|cell| cell == name)
            .ok_or_else(|| {
                PipelineError::Decode(format!("content CSV: header is missing column {name:?}"))
            })?;
    }
    Ok(map)
}

fn looks_like_header(row: &csv::StringRecord) -> bool {
    row.iter().any(|cell| cell == CONTENT_COLUMNS[0])
}

fn cell<'r>(
    row: &'r csv::StringRecord,
    columns: &ColumnMap,
    i: usize,
    line: u64,
) -> Result<&'r str> {
    row.get(columns[i]).ok_or_else(|| {
        PipelineError::Decode(format!(
            "line {line}: missing column {:?}",
            CONTENT_COLUMNS[i]
        ))
    })
}

/// Decode one data row through the column map.
fn decode_row(row: &csv::StringRecord, columns: &ColumnMap, line: u64) -> Result<ContentRow> {
    let get = |i: usize| cell(row, columns, i, line);

    let raw_id = get(0)?;
    let id: i64 = raw_id.parse().map_err(|_| {
        PipelineError::Decode(format!("line {line}: invalid objectID {raw_id:?}"))
    })?;
    if id == 0 {
        return Err(PipelineError::Decode(format!(
            "line {line}: objectID must be non-zero"
        )));
    }

    let stars_count = parse_number::<f64>(get(2)?, "stars_count", line)?;
    if !stars_count.is_finite() {
        return Err(PipelineError::Decode(format!(
            "line {line}: invalid stars_count {:?}",
            get(2)?
        )));
    }
    let reviews_count = parse_number::<i64>(get(3)?, "reviews_count", line)?;
    let price_range = PriceRange::classify(get(6)?)?;

    Ok(ContentRow {
        id,
        content: Content {
            food_type: get(1)?.to_string(),
            stars_count,
            reviews_count,
            neighborhood: get(4)?.to_string(),
            phone_number: get(5)?.to_string(),
            price_range,
            dining_style: get(7)?.to_string(),
        },
    })
}

/// Parse a numeric content cell. Empty cells decode as zero.
fn parse_number<T>(raw: &str, column: &str, line: u64) -> Result<T>
where
    T: std::str::FromStr + Default,
{
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse()
        .map_err(|_| PipelineError::Decode(format!("line {line}: invalid {column} {raw:?}")))
}

/// Decode the content dataset.
///
/// Decoding stops at the first invalid row: a bad price range or identifier
/// means the upstream export is corrupt, so no rows are returned.
pub fn decode_content(input: impl Read, header: HeaderMode) -> Result<Vec<ContentRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut columns = POSITIONAL;
    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut first = true;

    loop {
        let more = reader
            .read_record(&mut record)
            .map_err(|e| PipelineError::Decode(format!("content CSV: {e}")))?;
        if !more {
            break;
        }
        let line = record.position().map_or(0, |p| p.line());

        if std::mem::take(&mut first) {
            let is_header = match header {
                HeaderMode::Auto => looks_like_header(&record),
                HeaderMode::Present => true,
                HeaderMode::Absent => false,
            };
            if is_header {
                columns = map_header(&record)?;
                continue;
            }
        }

        // Blank trailing lines
        if record.len() == 1 && record.get(0) == Some("") {
            continue;
        }

        rows.push(decode_row(&record, &columns, line)?);
    }

    log::debug!("decoded {} content rows", rows.len());
    Ok(rows)
}

use std::path::Path;

use anyhow::{bail, Context};
use calamine::{open_workbook_auto, Data, DataType, Reader};

use crate::models::{RequirementItem, ResultRecord};

/// Locates the cash-flow row in the first worksheet and returns the numeric
/// cells following the marker token. The marker match is a case-insensitive
/// substring search anywhere in the sheet, as the source spreadsheets label
/// the row free-form ("FCL", "fcl proyectado", ...).
pub fn read_cash_flow(path: &Path, marker: &str) -> anyhow::Result<Vec<f64>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("workbook contains no worksheets")?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read worksheet {sheet_name}"))?;

    cash_flow_from_rows(range.rows(), marker)
}

fn cash_flow_from_rows<'a, I>(rows: I, marker: &str) -> anyhow::Result<Vec<f64>>
where
    I: Iterator<Item = &'a [Data]>,
{
    let marker_lower = marker.to_lowercase();

    for (row_index, row) in rows.enumerate() {
        let marker_position = row.iter().position(|cell| {
            !cell.is_empty() && cell.to_string().to_lowercase().contains(&marker_lower)
        });

        let Some(position) = marker_position else {
            continue;
        };

        let row_number = row_index + 1;
        let mut cash_flows = Vec::new();
        for cell in &row[position + 1..] {
            if cell.is_empty() {
                continue;
            }
            if let Some(value) = cell.as_f64() {
                cash_flows.push(value);
                continue;
            }

            let token = cell.to_string();
            match sanitize_number(&token) {
                Some(value) => cash_flows.push(value),
                None => bail!(
                    "row {row_number}: cell \"{token}\" after the {marker} marker is not numeric"
                ),
            }
        }

        if cash_flows.is_empty() {
            bail!("row {row_number} contains the {marker} marker but no cash-flow values");
        }
        return Ok(cash_flows);
    }

    bail!("no row containing the marker \"{marker}\" was found in the workbook")
}

/// Strips currency symbols and thousands separators before parsing.
fn sanitize_number(token: &str) -> Option<f64> {
    let cleaned: String = token
        .trim()
        .chars()
        .filter(|symbol| !matches!(symbol, '$' | '€' | ',' | ' '))
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

pub fn sheet_names(path: &Path) -> anyhow::Result<Vec<String>> {
    let workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook {}", path.display()))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Reads one category sheet of the ICMA requirements workbook. Column 0 is
/// the indicator id, column 1 the (unnamed) requirement text; rows with a
/// blank requirement are dropped. All items come back unmet.
pub fn read_checklist(path: &Path, sheet: &str) -> anyhow::Result<Vec<RequirementItem>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook {}", path.display()))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        bail!(
            "workbook has no sheet named \"{sheet}\" (available: {})",
            workbook.sheet_names().join(", ")
        );
    }

    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("failed to read worksheet {sheet}"))?;

    requirements_from_rows(range.rows())
}

fn requirements_from_rows<'a, I>(rows: I) -> anyhow::Result<Vec<RequirementItem>>
where
    I: Iterator<Item = &'a [Data]>,
{
    let mut items = Vec::new();
    let mut width_checked = false;

    // First row is the header ("Indicadores" plus an unnamed text column).
    for row in rows.skip(1) {
        if !width_checked && row.len() < 2 {
            bail!("the sheet does not have the expected requirements column");
        }
        width_checked = true;

        let requirement = match row.get(1) {
            Some(cell) if !cell.is_empty() => cell.to_string().trim().to_string(),
            _ => continue,
        };
        if requirement.is_empty() {
            continue;
        }

        let indicator = row
            .first()
            .filter(|cell| !cell.is_empty())
            .map(|cell| cell.to_string().trim().to_string())
            .unwrap_or_default();

        items.push(RequirementItem {
            indicator,
            requirement,
            met: false,
        });
    }

    if items.is_empty() {
        bail!("the sheet lists no requirements");
    }
    Ok(items)
}

pub fn write_result(path: &Path, record: &ResultRecord) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    writer.serialize(record)?;
    writer.flush().context("failed to flush the result file")?;
    Ok(())
}

pub fn write_checklist(path: &Path, items: &[RequirementItem]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    for item in items {
        writer.serialize(item)?;
    }
    writer.flush().context("failed to flush the checklist file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_refs(rows: &[Vec<Data>]) -> impl Iterator<Item = &[Data]> {
        rows.iter().map(|row| row.as_slice())
    }

    #[test]
    fn finds_the_marker_row_and_parses_the_tail() {
        let rows = vec![
            vec![Data::String("Year".into()), Data::Int(2024), Data::Int(2025)],
            vec![
                Data::String("fcl proyectado".into()),
                Data::Float(-100.0),
                Data::String("$60".into()),
                Data::String("1,200.50".into()),
            ],
        ];
        let flows = cash_flow_from_rows(row_refs(&rows), "FCL").unwrap();
        assert_eq!(flows, vec![-100.0, 60.0, 1200.5]);
    }

    #[test]
    fn skips_blank_cells_after_the_marker() {
        let rows = vec![vec![
            Data::String("FCL".into()),
            Data::Empty,
            Data::Float(-50.0),
            Data::Empty,
            Data::Float(20.0),
        ]];
        let flows = cash_flow_from_rows(row_refs(&rows), "FCL").unwrap();
        assert_eq!(flows, vec![-50.0, 20.0]);
    }

    #[test]
    fn missing_marker_row_is_an_error() {
        let rows = vec![vec![Data::String("Revenue".into()), Data::Float(10.0)]];
        let error = cash_flow_from_rows(row_refs(&rows), "FCL").unwrap_err();
        assert!(error.to_string().contains("FCL"));
    }

    #[test]
    fn marker_row_without_values_is_an_error() {
        let rows = vec![vec![Data::String("FCL".into()), Data::Empty]];
        assert!(cash_flow_from_rows(row_refs(&rows), "FCL").is_err());
    }

    #[test]
    fn non_numeric_token_after_marker_names_the_row() {
        let rows = vec![
            vec![Data::Empty],
            vec![
                Data::String("FCL".into()),
                Data::Float(-10.0),
                Data::String("n/a".into()),
            ],
        ];
        let error = cash_flow_from_rows(row_refs(&rows), "FCL")
            .unwrap_err()
            .to_string();
        assert!(error.contains("row 2"), "error was: {error}");
        assert!(error.contains("n/a"), "error was: {error}");
    }

    #[test]
    fn sanitizer_strips_currency_and_separators() {
        assert_eq!(sanitize_number("$1,200.50"), Some(1200.5));
        assert_eq!(sanitize_number(" -3,000 "), Some(-3000.0));
        assert_eq!(sanitize_number("€250"), Some(250.0));
        assert_eq!(sanitize_number("abc"), None);
        assert_eq!(sanitize_number(""), None);
    }

    #[test]
    fn checklist_rows_with_blank_requirements_are_dropped() {
        let rows = vec![
            vec![Data::String("Indicadores".into()), Data::Empty],
            vec![Data::String("E1".into()), Data::String("Meter audit".into())],
            vec![Data::String("E2".into()), Data::Empty],
            vec![Data::Empty, Data::String("Baseline report".into())],
        ];
        let items = requirements_from_rows(row_refs(&rows)).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].indicator, "E1");
        assert_eq!(items[1].requirement, "Baseline report");
        assert!(items.iter().all(|item| !item.met));
    }

    #[test]
    fn checklist_sheet_without_text_column_is_an_error() {
        let rows = vec![
            vec![Data::String("Indicadores".into())],
            vec![Data::String("E1".into())],
        ];
        assert!(requirements_from_rows(row_refs(&rows)).is_err());
    }

    #[test]
    fn result_record_round_trips_through_csv() {
        let record = ResultRecord {
            net_present_value: 4.132231404958677,
            internal_rate_of_return: 0.13066,
            return_on_investment: 20.0,
            payback_period: 2,
            compliance_pct: 50.0,
            total_score: 100.0,
            verdict: "highly viable".to_string(),
        };

        let path = std::env::temp_dir().join(format!(
            "green-bond-result-roundtrip-{}.csv",
            std::process::id()
        ));
        write_result(&path, &record).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let read_back: ResultRecord = reader.deserialize().next().unwrap().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(read_back, record);
    }
}

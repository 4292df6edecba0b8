use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::dash::{io_common::ParsedTable, *};

pub fn read_xlsx_table(path: &str, cfs: &FileSource) -> BDashResult<ParsedTable> {
    let wrange = get_range(path, cfs)?;
    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(read_cell)
        .collect();
    debug!("read_xlsx_table: header: {:?}", header);

    let rows: Vec<Vec<String>> = iter
        .map(|row| row.iter().map(read_cell).collect())
        .collect();
    debug!("read_xlsx_table: {:?} rows", rows.len());
    Ok(ParsedTable { header, rows })
}

// Numbers are written the way the spreadsheet shows them: 2010.0 becomes "2010".
fn read_cell(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Empty => "".to_string(),
        x => x.to_string().trim().to_string(),
    }
}

fn get_range(path: &str, cfs: &FileSource) -> BDashResult<Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "read_xlsx_table: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                name: worksheet_name.clone(),
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}

use lossy_core::report::{SizeReport, SizeRow};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct StageSizeRow {
    #[tabled(rename = "Size of")]
    stage: String,
    #[tabled(rename = "Terms")]
    terms: usize,
    #[tabled(rename = "Terms % change")]
    terms_change: String,
    #[tabled(rename = "Terms % cml.")]
    terms_cumulative: String,
    #[tabled(rename = "Postings")]
    postings: usize,
    #[tabled(rename = "Postings % change")]
    postings_change: String,
    #[tabled(rename = "Postings % cml.")]
    postings_cumulative: String,
}

impl From<&SizeRow> for StageSizeRow {
    fn from(row: &SizeRow) -> Self {
        Self {
            stage: row.size.stage.label(),
            terms: row.size.terms,
            terms_change: format!("{:.2}", row.terms_change),
            terms_cumulative: format!("{:.2}", row.terms_cumulative),
            postings: row.size.postings,
            postings_change: format!("{:.2}", row.postings_change),
            postings_cumulative: format!("{:.2}", row.postings_cumulative),
        }
    }
}

/// Dictionary and non-positional postings sizes per stage, with step and cumulative change.
pub fn format_report(report: &SizeReport) -> String {
    let rows: Vec<StageSizeRow> = report.rows.iter().map(StageSizeRow::from).collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

pub fn print_report(report: &SizeReport) {
    println!("\n{}", format_report(report));
}

pub fn print_postings(term: &str, postings: &[u32]) {
    if postings.is_empty() {
        println!("\nThe query \"{term}\" does not exist in the index");
    } else {
        println!("\nThe query \"{term}\" is found in {} articles:\n{postings:?}", postings.len());
    }
}

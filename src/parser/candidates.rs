use super::table::{parse_count, Cell, ParseError, RowShape};
use crate::db::CandidateResult;

/// S.No | Constituency | Winning Candidate | Total Votes | Margin, tagged with
/// the party whose page is being read.
pub struct CandidateShape<'a> {
    pub party: &'a str,
}

impl RowShape for CandidateShape<'_> {
    type Record = CandidateResult;

    fn min_cells(&self) -> usize {
        5
    }

    fn parse(&self, cells: &[Cell]) -> Result<CandidateResult, ParseError> {
        Ok(CandidateResult {
            serial_number: cells[0].text.clone(),
            constituency: cells[1].text.clone(),
            winning_candidate: cells[2].text.clone(),
            total_votes: parse_count("Total Votes", &cells[3].text)?,
            margin: parse_count("Margin", &cells[4].text)?,
            party: self.party.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::table::{extract, ExtractError};

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn party_page_fixture() {
        let shape = CandidateShape { party: "Bharatiya Janata Party - BJP" };
        let rows = extract(&fixture("party_bjp"), "table.table-striped", &shape).unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].constituency, "Gandhinagar(6)");
        assert_eq!(rows[0].winning_candidate, "AMIT SHAH");
        assert_eq!(rows[0].total_votes, 1010972);
        assert_eq!(rows[0].margin, 744716);
        assert!(rows.iter().all(|r| r.party == "Bharatiya Janata Party - BJP"));
    }

    #[test]
    fn dash_margin_is_zero() {
        let shape = CandidateShape { party: "BJP" };
        let rows = extract(&fixture("party_bjp"), "table.table-striped", &shape).unwrap();
        let surat = rows.iter().find(|r| r.constituency == "Surat(24)").unwrap();
        assert_eq!(surat.total_votes, 0);
        assert_eq!(surat.margin, 0);
    }

    #[test]
    fn ragged_rows_are_skipped() {
        let shape = CandidateShape { party: "Small Party" };
        let rows = extract(&fixture("party_ragged"), "table.table-striped", &shape).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].winning_candidate, "SECOND WINNER");
    }

    #[test]
    fn page_without_table() {
        let shape = CandidateShape { party: "X" };
        let err = extract(&fixture("no_table"), "table.table-striped", &shape).unwrap_err();
        assert!(matches!(err, ExtractError::TableNotFound(_)));
    }
}

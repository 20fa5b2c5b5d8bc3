use tracing::warn;

use super::table::{parse_count, Cell, ParseError, RowShape};
use crate::db::PartyResult;

/// Party | Won | Leading | Total, with the party's results link in the "Won" cell.
pub struct PartyShape;

impl RowShape for PartyShape {
    type Record = PartyResult;

    fn min_cells(&self) -> usize {
        4
    }

    fn parse(&self, cells: &[Cell]) -> Result<PartyResult, ParseError> {
        let party = cells[0].text.clone();
        let won = parse_count("Won", &cells[1].text)?;
        let leading = parse_count("Leading", &cells[2].text)?;
        let listed_total = parse_count("Total", &cells[3].text)?;
        let link = cells[1]
            .href
            .clone()
            .ok_or(ParseError::MissingLink { column: "Won" })?;

        let total = won + leading;
        if listed_total != total {
            warn!(
                party = %party,
                won,
                leading,
                listed_total,
                "listed total disagrees with won + leading; using won + leading"
            );
        }

        Ok(PartyResult {
            party,
            won,
            leading,
            total,
            link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::table::extract;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn index_fixture() {
        let parties = extract(&fixture("index"), "table.table", &PartyShape).unwrap();
        assert_eq!(parties.len(), 10);

        let first = &parties[0];
        assert_eq!(first.party, "Bharatiya Janata Party - BJP");
        assert_eq!((first.won, first.leading, first.total), (238, 2, 240));
        assert_eq!(first.link, "partywisewinresult-369.htm");

        for p in &parties {
            assert_eq!(p.total, p.won + p.leading, "{}", p.party);
        }
        assert_eq!(parties.iter().map(|p| p.total).sum::<u64>(), 464);
        assert_eq!(parties[6].party, "Janata Dal (United) - JD(U)");
    }

    #[test]
    fn total_is_rebuilt_from_won_and_leading() {
        let cells = vec![
            Cell { text: "P".into(), href: None },
            Cell { text: "3".into(), href: Some("p.htm".into()) },
            Cell { text: "1".into(), href: None },
            Cell { text: "9".into(), href: None },
        ];
        let p = PartyShape.parse(&cells).unwrap();
        assert_eq!(p.total, 4);
    }

    #[test]
    fn missing_link_is_an_error() {
        let cells = vec![
            Cell { text: "P".into(), href: None },
            Cell { text: "3".into(), href: None },
            Cell { text: "0".into(), href: None },
            Cell { text: "3".into(), href: None },
        ];
        assert_eq!(
            PartyShape.parse(&cells),
            Err(ParseError::MissingLink { column: "Won" })
        );
    }
}

//! MODCOD table file parsing: OpenSAND's own MODCOD tables are a simple
//! whitespace-separated text format (`id bits_per_symbol`, one row per
//! line, `#` comments), not TOML/JSON — this parser follows that
//! convention rather than reinventing a structured format.

use crate::error::InitError;
use crate::scheduler::modcod::{ModcodDef, ModcodTable};

pub fn parse_modcod_table(text: &str) -> Result<ModcodTable, InitError> {
    let mut rows = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let id = fields
            .next()
            .ok_or_else(|| InitError::Modcod(format!("line {}: missing id", lineno + 1)))?
            .parse::<u8>()
            .map_err(|e| InitError::Modcod(format!("line {}: bad id: {e}", lineno + 1)))?;
        let bits_per_symbol = fields
            .next()
            .ok_or_else(|| InitError::Modcod(format!("line {}: missing bits_per_symbol", lineno + 1)))?
            .parse::<f64>()
            .map_err(|e| InitError::Modcod(format!("line {}: bad bits_per_symbol: {e}", lineno + 1)))?;
        rows.push(ModcodDef { id, bits_per_symbol });
    }
    if rows.is_empty() {
        return Err(InitError::Modcod("table is empty".into()));
    }
    Ok(ModcodTable::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whitespace_table_skipping_comments_and_blanks() {
        let text = "# id bits_per_symbol\n1 0.5\n\n5 2.0\n10 4.0\n";
        let table = parse_modcod_table(text).unwrap();
        assert_eq!(table.get(5).unwrap().bits_per_symbol, 2.0);
    }

    #[test]
    fn empty_table_is_an_error() {
        assert!(parse_modcod_table("# only a comment\n").is_err());
    }

    #[test]
    fn malformed_row_is_an_error() {
        assert!(parse_modcod_table("abc 1.0\n").is_err());
    }
}

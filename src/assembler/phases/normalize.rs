use super::types::Loc;
use crate::assembler::model::RawLine;

const COMMENT_MARKERS: [&str; 2] = ["#", "//"];
const SEPARATOR_CHAR: char = ',';

/// Strips comments and separators from one line of source, returning `None` if
/// nothing remains.
///
/// Note that no tokenization happens here: operand syntax is the validator's concern.
pub fn clean_line(line: &str) -> Option<String> {
    let end = COMMENT_MARKERS
        .iter()
        .filter_map(|marker| line.find(*marker))
        .min()
        .unwrap_or_else(|| line.len());

    let cleaned = line[..end].replace(SEPARATOR_CHAR, "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_owned())
    }
}

/// Produces one `RawLine` for every line of `source` with content, in source order.
pub fn normalize(source: &str) -> Vec<RawLine> {
    source
        .lines()
        .enumerate()
        .filter_map(|(line_no, line)| {
            clean_line(line).map(|text| RawLine::new(Loc::new(line_no + 1), line, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn texts(source: &str) -> Vec<String> {
        normalize(source)
            .iter()
            .map(|line| line.text().to_owned())
            .collect()
    }

    #[test]
    fn strips_hash_comments() {
        assert_eq!(clean_line("ADD R1 R2 R3 # sum"), Some("ADD R1 R2 R3".to_owned()));
        assert_eq!(clean_line("ADD R1 R2 R3#sum"), Some("ADD R1 R2 R3".to_owned()));
        assert_eq!(clean_line("# just a comment"), None);
    }

    #[test]
    fn strips_slash_comments() {
        assert_eq!(clean_line("JMP 4 // loop"), Some("JMP 4".to_owned()));
        assert_eq!(clean_line("//"), None);
        assert_eq!(clean_line("JMP 4 // a # b"), Some("JMP 4".to_owned()));
        assert_eq!(clean_line("JMP 4 # a // b"), Some("JMP 4".to_owned()));
    }

    #[test]
    fn removes_commas() {
        assert_eq!(clean_line("ADD R1, R2, R3"), Some("ADD R1 R2 R3".to_owned()));
        assert_eq!(clean_line("ADD R1,R2,R3"), Some("ADD R1R2R3".to_owned()));
        assert_eq!(clean_line(" , , "), None);
    }

    #[test]
    fn drops_blank_lines_and_keeps_numbers() {
        let source = "\n  LOADI R1, 10  \n\n# comment\n\tADD R3 R1 R2\n   \n";
        let lines = normalize(source);

        assert_eq!(
            lines.iter().map(|line| line.loc().line()).collect::<Vec<_>>(),
            vec![2, 5]
        );
        assert_eq!(lines[0].text(), "LOADI R1 10");
        assert_eq!(lines[0].original(), "LOADI R1, 10");
        assert_eq!(lines[1].text(), "ADD R3 R1 R2");
    }

    #[test]
    fn idempotent() {
        let source = "LOADI R1, 0xA  # ten\n\n  // nothing\nSHL R1 R2, 0b1, 3\nCMP R1 R2 //";
        let once = texts(source).iter().join("\n");
        let twice = texts(&once).iter().join("\n");
        assert_eq!(once, twice);
        assert_eq!(once, "LOADI R1 0xA\nSHL R1 R2 0b1 3\nCMP R1 R2");
    }
}

//! Translation of LDML-style date patterns (`dd/MM/yyyy`, `EEEE, d MMMM`)
//! into chrono `strftime` strings.

use crate::error::Error;

/// Compiles an LDML pattern to a chrono format string.
///
/// Text between single quotes is literal (`''` is a quote). Letters outside
/// quotes must form a supported token.
pub fn to_strftime(pattern: &str) -> Result<String, Error> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            let close = chars[i + 1..]
                .iter()
                .position(|&ch| ch == '\'')
                .ok_or_else(|| Error::invalid_pattern(pattern, "unterminated quoted literal"))?;
            for &literal in &chars[i + 1..i + 1 + close] {
                push_literal(&mut out, literal);
            }
            i += close + 2;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&ch| ch == c).count();
        let directive = match (c, run) {
            ('y', 2) => "%y",
            ('y', _) => "%Y",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('d', 1) => "%-d",
            ('d', 2) => "%d",
            ('E', 1..=3) => "%a",
            ('E', _) => "%A",
            ('H', 1) => "%-H",
            ('H', 2) => "%H",
            ('h', 1) => "%-I",
            ('h', 2) => "%I",
            ('m', 1) => "%-M",
            ('m', 2) => "%M",
            ('s', 1) => "%-S",
            ('s', 2) => "%S",
            ('a', _) => "%p",
            _ => {
                let token: String = std::iter::repeat_n(c, run).collect();
                return Err(Error::invalid_pattern(
                    pattern,
                    format!("unsupported token `{}`", token),
                ));
            }
        };
        out.push_str(directive);
        i += run;
    }

    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cultural_patterns() {
        assert_eq!(to_strftime("dd/MM/yyyy").unwrap(), "%d/%m/%Y");
        assert_eq!(to_strftime("MM/dd/yyyy").unwrap(), "%m/%d/%Y");
        assert_eq!(to_strftime("dd.MM.yyyy").unwrap(), "%d.%m.%Y");
        assert_eq!(to_strftime("EEEE, d MMMM yyyy").unwrap(), "%A, %-d %B %Y");
        assert_eq!(to_strftime("h:mm a").unwrap(), "%-I:%M %p");
    }

    #[test]
    fn test_quoted_literals() {
        assert_eq!(to_strftime("d 'of' MMMM").unwrap(), "%-d of %B");
        assert_eq!(to_strftime("HH'h'mm").unwrap(), "%Hh%M");
        assert_eq!(to_strftime("yyyy''MM").unwrap(), "%Y'%m");
        assert_eq!(to_strftime("100% dd").unwrap(), "100%% %d");
    }

    #[test]
    fn test_rejects_unknown_tokens() {
        let err = to_strftime("dd/QQ").unwrap_err();
        assert!(err.to_string().contains("unsupported token `QQ`"));
        assert!(to_strftime("dd 'open").is_err());
    }
}

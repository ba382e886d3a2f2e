//! SQL statement normalization.
//!
//! A single pass replaces literals with indexed placeholders so that
//! structurally identical statements intern to one cache entry: the k-th
//! (0-indexed) string literal becomes `<quote>k$<quote>` and the k-th
//! numeric literal becomes `k#`. The extracted literals are returned
//! comma-joined so the collector can substitute them back.
//!
//! Quote doubling (`''`) is honoured inside string literals; a backslash
//! is an ordinary character there, NOT an escape. `--` line comments are
//! dropped, `/* … */` block comments collapse to a single space.

/// Default truncation limit applied to incoming statements.
pub const DEFAULT_MAX_SQL_LENGTH: usize = 2048;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SqlNormalizeResult {
    pub normalized_sql: String,
    /// Extracted literals in order of appearance, comma-joined. String
    /// literals keep their surrounding quotes.
    pub parameters: String,
}

pub struct SqlNormalizer {
    max_sql_length: usize,
}

enum State {
    Normal,
    InLineComment,
    InBlockComment,
    InBlockCommentEnd,
}

fn is_quote_char(c: u8) -> bool {
    c == b'\'' || c == b'"' || c == b'`'
}

fn is_identifier_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

impl SqlNormalizer {
    pub fn new(max_sql_length: usize) -> SqlNormalizer {
        SqlNormalizer { max_sql_length }
    }

    pub fn normalize(&self, sql: &str) -> SqlNormalizeResult {
        if sql.is_empty() {
            return SqlNormalizeResult::default();
        }

        // Truncate on a char boundary so multi-byte content survives.
        let mut limit = self.max_sql_length.min(sql.len());
        while limit < sql.len() && !sql.is_char_boundary(limit) {
            limit -= 1;
        }
        let bytes = &sql.as_bytes()[..limit];
        let len = bytes.len();

        let mut out: Vec<u8> = Vec::with_capacity(len);
        let mut parameters: Vec<Vec<u8>> = Vec::new();
        let mut param_index: usize = 0;
        let mut state = State::Normal;
        // Last byte handled in the Normal state; gates the leading '-'.
        let mut prev: u8 = 0;

        let mut i = 0;
        while i < len {
            let c = bytes[i];
            let next = if i + 1 < len { bytes[i + 1] } else { 0 };

            match state {
                State::Normal => {
                    if c == b'-' && next == b'-' {
                        state = State::InLineComment;
                        i += 2;
                        continue;
                    }
                    if c == b'/' && next == b'*' {
                        state = State::InBlockComment;
                        i += 2;
                        continue;
                    }

                    if is_quote_char(c) {
                        let quote = c;
                        let mut literal: Vec<u8> = vec![c];
                        let mut closed = false;
                        i += 1;
                        while i < len {
                            let str_c = bytes[i];
                            literal.push(str_c);
                            if str_c == quote {
                                if i + 1 < len && bytes[i + 1] == quote {
                                    // Doubled quote stays inside the literal.
                                    i += 1;
                                    literal.push(bytes[i]);
                                } else {
                                    closed = true;
                                    break;
                                }
                            }
                            i += 1;
                        }

                        if closed {
                            parameters.push(literal);
                            out.push(quote);
                            out.extend_from_slice(param_index.to_string().as_bytes());
                            out.push(b'$');
                            out.push(quote);
                            param_index += 1;
                            prev = quote;
                            i += 1;
                        } else {
                            out.extend_from_slice(&literal);
                            prev = *literal.last().unwrap_or(&quote);
                            i = len;
                        }
                        continue;
                    }

                    let starts_number = (c.is_ascii_digit() && !is_identifier_char(prev))
                        || (c == b'-' && next.is_ascii_digit() && !is_identifier_char(prev));
                    if starts_number {
                        let mut number: Vec<u8> = Vec::new();
                        if c == b'-' {
                            number.push(c);
                            i += 1;
                        }
                        while i < len && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                            number.push(bytes[i]);
                            i += 1;
                        }
                        parameters.push(number);
                        out.extend_from_slice(param_index.to_string().as_bytes());
                        out.push(b'#');
                        param_index += 1;
                        prev = b'#';
                        continue;
                    }

                    out.push(c);
                    prev = c;
                    i += 1;
                }
                State::InLineComment => {
                    if c == b'\n' || c == b'\r' {
                        state = State::Normal;
                        out.push(c);
                        prev = c;
                    }
                    i += 1;
                }
                State::InBlockComment => {
                    if c == b'*' && next == b'/' {
                        state = State::InBlockCommentEnd;
                    }
                    i += 1;
                }
                State::InBlockCommentEnd => {
                    state = State::Normal;
                    out.push(b' ');
                    prev = b' ';
                    i += 1;
                }
            }
        }

        SqlNormalizeResult {
            normalized_sql: String::from_utf8_lossy(&out).into_owned(),
            parameters: String::from_utf8_lossy(&parameters.join(&b","[..])).into_owned(),
        }
    }
}

impl Default for SqlNormalizer {
    fn default() -> SqlNormalizer {
        SqlNormalizer::new(DEFAULT_MAX_SQL_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(sql: &str) -> SqlNormalizeResult {
        SqlNormalizer::default().normalize(sql)
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), SqlNormalizeResult::default());
    }

    #[test]
    fn numbers_and_strings_become_indexed_placeholders() {
        let result =
            normalize("SELECT * FROM t WHERE id=123 AND name='a''b' /* c */ -- x");
        assert_eq!(
            result.normalized_sql,
            "SELECT * FROM t WHERE id=0# AND name='1$'   "
        );
        assert_eq!(result.parameters, "123,'a''b'");
    }

    #[test]
    fn double_quoted_and_backtick_literals_keep_their_quote_char() {
        let result = normalize(r#"SELECT "col", `tab` FROM x"#);
        assert_eq!(result.normalized_sql, r#"SELECT "0$", `1$` FROM x"#);
        assert_eq!(result.parameters, r#""col",`tab`"#);
    }

    #[test]
    fn negative_and_decimal_numbers() {
        let result = normalize("WHERE a=-5 AND b=3.25");
        assert_eq!(result.normalized_sql, "WHERE a=0# AND b=1#");
        assert_eq!(result.parameters, "-5,3.25");
    }

    #[test]
    fn minus_after_identifier_is_an_operator() {
        let result = normalize("SELECT a-5 FROM t");
        // 'a' is an identifier char, so '-' stays and only '5' is scanned...
        // which itself follows '-', a non-identifier char.
        assert_eq!(result.normalized_sql, "SELECT a-0# FROM t");
        assert_eq!(result.parameters, "5");
    }

    #[test]
    fn digits_inside_identifiers_are_untouched() {
        let result = normalize("SELECT col1 FROM tab2");
        assert_eq!(result.normalized_sql, "SELECT col1 FROM tab2");
        assert_eq!(result.parameters, "");
    }

    #[test]
    fn backslash_is_not_an_escape() {
        // The literal terminates at the quote following the backslash; the
        // trailing "s'" is left in statement position.
        let result = normalize(r"SELECT 'John\'s'");
        assert_eq!(result.normalized_sql, r"SELECT '0$'s'");
        assert_eq!(result.parameters, r"'John\'");
    }

    #[test]
    fn line_comment_keeps_the_newline() {
        let result = normalize("SELECT 1 -- trailing\nFROM t");
        assert_eq!(result.normalized_sql, "SELECT 0# \nFROM t");
        assert_eq!(result.parameters, "1");
    }

    #[test]
    fn unclosed_literal_is_emitted_as_is() {
        let result = normalize("SELECT 'oops");
        assert_eq!(result.normalized_sql, "SELECT 'oops");
        assert_eq!(result.parameters, "");
    }

    #[test]
    fn truncates_to_max_length() {
        let normalizer = SqlNormalizer::new(8);
        let result = normalizer.normalize("SELECT 123456");
        assert_eq!(result.normalized_sql, "SELECT 0#");
        assert_eq!(result.parameters, "1");
    }

    #[test]
    fn substitution_round_trip() {
        let input = "INSERT INTO t VALUES (42, 'x', \"y\", 7.5)";
        let result = normalize(input);
        let params: Vec<&str> = result.parameters.split(',').collect();

        let mut rebuilt = result.normalized_sql.clone();
        for (k, param) in params.iter().enumerate() {
            let num = format!("{}#", k);
            for quote in ["'", "\"", "`"] {
                let placeholder = format!("{}{}${}", quote, k, quote);
                if rebuilt.contains(&placeholder) {
                    rebuilt = rebuilt.replace(&placeholder, param);
                }
            }
            if rebuilt.contains(&num) {
                rebuilt = rebuilt.replace(&num, param);
            }
        }
        assert_eq!(rebuilt, input);
    }
}

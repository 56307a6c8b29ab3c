// Copyright takubokudori.
// This source code is licensed under the MIT or Apache-2.0 license.
//! POSIX shell quoting.
use crate::types::*;

#[inline]
fn is_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "@%+=:,./-_".contains(ch)
}

/// POSIX shell escape.
///
/// Returns `s` unchanged if it needs no quoting, otherwise surrounds it with
/// single quotes and replaces each single quote with `'"'"'`.
pub fn sh_quote(s: &str) -> String {
    if !s.is_empty() && s.chars().all(is_safe) {
        return s.to_string();
    }
    let mut ret = String::with_capacity(s.len() + 2);
    ret.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            ret.push_str("'\"'\"'");
        } else {
            ret.push(ch);
        }
    }
    ret.push('\'');
    ret
}

/// Joins `args` into one shell command line.
pub fn sh_join<T: AsRef<str>>(args: &[T]) -> String {
    args.iter()
        .map(|x| sh_quote(x.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits `s` into words the way a POSIX shell does.
///
/// Handles single quotes, double quotes and backslash escapes. Expansions
/// and operators are not interpreted.
pub fn sh_split(s: &str) -> PveResult<Vec<String>> {
    let mut ret = vec![];
    let mut word = String::new();
    let mut in_word = false;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        match ch {
            ch if ch.is_whitespace() => {
                if in_word {
                    ret.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => word.push(ch),
                        None => return unterminated(s),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\' | '$' | '`')) => word.push(ch),
                            Some('\n') => {}
                            Some(ch) => {
                                word.push('\\');
                                word.push(ch);
                            }
                            None => return unterminated(s),
                        },
                        Some(ch) => word.push(ch),
                        None => return unterminated(s),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some('\n') => {}
                    Some(ch) => word.push(ch),
                    None => return unterminated(s),
                }
            }
            ch => {
                in_word = true;
                word.push(ch);
            }
        }
    }
    if in_word {
        ret.push(word);
    }
    Ok(ret)
}

fn unterminated(s: &str) -> PveResult<Vec<String>> {
    pveerr!(ErrorKind::InvalidParameter(format!(
        "Unterminated quote or escape: {}",
        s
    )))
}

use itertools::Itertools;

use crate::set::CharSet;

/// Returns a printable representation of a byte. Control characters are
/// printed in caret notation (`^J` is a newline), space is printed as `\s`
/// and non-ASCII bytes are printed in hex.
pub(crate) fn fmt_char(c: u8) -> String {
    match c {
        0x00..=0x1F => format!("^{}", (c + b'@') as char),
        b' ' => String::from(r"\s"),
        0x7F => String::from("^?"),
        0x80..=0xFF => format!(r"\x{:02X}", c),
        _ => (c as char).to_string(),
    }
}

/// Groups the members yielded by `members`, which must be in ascending
/// order, into inclusive ranges of consecutive values.
pub(crate) fn ranges<I>(members: I) -> impl Iterator<Item = (usize, usize)>
where
    I: Iterator<Item = usize>,
{
    members.map(|m| (m, m)).coalesce(|a, b| {
        if b.0 == a.1 + 1 {
            Ok((a.0, b.1))
        } else {
            Err((a, b))
        }
    })
}

/// Formats a range of bytes. Ranges of one or two bytes are printed as the
/// bytes themselves, longer ones as `first-last`.
pub(crate) fn fmt_range(lo: usize, hi: usize) -> String {
    let lo_str = fmt_char(lo as u8);
    match hi - lo {
        0 => lo_str,
        1 => format!("{}{}", lo_str, fmt_char(hi as u8)),
        _ => format!("{}-{}", lo_str, fmt_char(hi as u8)),
    }
}

/// Formats a character class as `[...]`, compressing runs of consecutive
/// characters into ranges.
pub(crate) fn fmt_class(set: &CharSet) -> String {
    let members = set.iter().take_while(|m| *m <= u8::MAX as usize);
    format!(
        "[{}]",
        ranges(members).map(|(lo, hi)| fmt_range(lo, hi)).join("")
    )
}

/*! Decoding of escape sequences found in patterns.

The following sequences are recognized:

```text
\b      backspace
\f      formfeed
\n      newline
\r      carriage return
\s      space
\t      tab
\e      ASCII ESC character (0x1B)
\DDD    number formed of 1-3 octal digits
\xDD    number formed of 1-2 hex digits
\^C     control code, C is any letter (\^M is a carriage return)
```

Any other character following a backslash is taken literally, so `\.` is a
dot and `\\` is a backslash. A lone backslash at the end of the input is a
backslash.
*/

/// Decodes the byte at the start of `input`, which may be an escape
/// sequence, and returns its value together with the number of bytes
/// consumed from `input`.
///
/// # Panics
///
/// If `input` is empty.
pub fn escape(input: &[u8]) -> (u8, usize) {
    if input[0] != b'\\' {
        return (input[0], 1);
    }

    let Some(&c) = input.get(1) else {
        return (b'\\', 1);
    };

    match c {
        b'b' => (0x08, 2),
        b'f' => (0x0C, 2),
        b'n' => (b'\n', 2),
        b'r' => (b'\r', 2),
        b's' => (b' ', 2),
        b't' => (b'\t', 2),
        b'e' => (0x1B, 2),
        b'^' => match input.get(2) {
            Some(c) => (c.to_ascii_uppercase().wrapping_sub(b'@'), 3),
            None => (b'^', 2),
        },
        b'x' => {
            let digits = input[2..]
                .iter()
                .take(2)
                .take_while(|c| c.is_ascii_hexdigit())
                .count();

            if digits == 0 {
                return (b'x', 2);
            }

            let value = input[2..2 + digits]
                .iter()
                .fold(0_u8, |acc, c| (acc << 4) | hex_value(*c));

            (value, 2 + digits)
        }
        b'0'..=b'7' => {
            let digits = input[1..]
                .iter()
                .take(3)
                .take_while(|c| matches!(c, b'0'..=b'7'))
                .count();

            // Three octal digits can exceed 255, the result is masked to
            // a byte.
            let value = input[1..1 + digits]
                .iter()
                .fold(0_u32, |acc, c| (acc << 3) | (c - b'0') as u32);

            ((value & 0xFF) as u8, 1 + digits)
        }
        c => (c, 2),
    }
}

fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => unreachable!(),
    }
}

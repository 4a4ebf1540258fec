/*! Sources of input lines.

The rule parser pulls its input one line at a time from a [`LineSource`]. Any
iterator that yields strings is a line source, so rules can come from a
`Vec<&str>`, from `str::lines`, or from a file read with
`BufRead::lines` after the I/O errors have been dealt with.
*/

/// Provides the lines of text that the rule parser consumes.
///
/// Lines are returned without their trailing newline. `None` means that
/// there is no more input.
pub trait LineSource {
    /// Returns the next line, or `None` when the input is exhausted.
    fn next_line(&mut self) -> Option<String>;
}

impl<I> LineSource for I
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    fn next_line(&mut self) -> Option<String> {
        self.next().map(|line| line.as_ref().to_string())
    }
}

/// Renders bytes as an escaped ASCII string so that wire-level assertions
/// print something readable when they fail.
#[derive(PartialEq)]
pub struct AsciiDebug<'s>(pub &'s [u8]);

impl<'s> std::fmt::Debug for AsciiDebug<'s> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.0.escape_ascii())
    }
}

impl<'s> From<&'s [u8]> for AsciiDebug<'s> {
    fn from(value: &'s [u8]) -> Self {
        Self(value)
    }
}

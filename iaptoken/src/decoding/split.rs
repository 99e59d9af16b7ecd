use memchr::memchr_iter;

use crate::error::SplitError;

/// Borrowed view of a compact token cut at its two `.` delimiters
#[derive(Debug)]
pub struct SplitToken<'a> {
    data: &'a [u8],
    // offsets of the delimiters, `first_dot < second_dot`
    first_dot: usize,
    second_dot: usize,
}

impl<'a> TryFrom<&'a [u8]> for SplitToken<'a> {
    type Error = SplitError;

    fn try_from(data: &'a [u8]) -> Result<Self, Self::Error> {
        let mut dots = memchr_iter(b'.', data);
        match (dots.next(), dots.next(), dots.next()) {
            (Some(first_dot), Some(second_dot), None) => Ok(SplitToken {
                data,
                first_dot,
                second_dot,
            }),
            (Some(_), Some(_), Some(_)) => Err(SplitError::Oversized),
            _ => Err(SplitError::Undersized),
        }
    }
}

impl SplitToken<'_> {
    #[must_use]
    pub fn b64_header(&self) -> &[u8] {
        &self.data[..self.first_dot]
    }

    #[must_use]
    pub fn b64_payload(&self) -> &[u8] {
        &self.data[self.first_dot + 1..self.second_dot]
    }

    /// Signing input: encoded header and payload with the delimiter between them
    #[must_use]
    pub fn b64_message(&self) -> &[u8] {
        &self.data[..self.second_dot]
    }

    #[must_use]
    pub fn b64_signature(&self) -> &[u8] {
        &self.data[self.second_dot + 1..]
    }

    #[must_use]
    pub fn has_empty_section(&self) -> bool {
        self.b64_header().is_empty()
            || self.b64_payload().is_empty()
            || self.b64_signature().is_empty()
    }
}

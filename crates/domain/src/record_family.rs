use std::fmt;

/// Address family of a locally answerable record type.
///
/// Local host records materialize answers for A and AAAA only; every other
/// query type falls through to upstream forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordFamily {
    A,
    Aaaa,
}

impl RecordFamily {
    /// Key component used by the host index ("name:A" / "name:AAAA")
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordFamily::A => "A",
            RecordFamily::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

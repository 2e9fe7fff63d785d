#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd)]
pub enum HttpVersion {
    Http10 = 0,
    #[default]
    Http11 = 1,
}

impl HttpVersion {
    /// Whether a connection speaking this version may be taken over and
    /// written to directly. HTTP/1.0 has no chunked framing and no persistent
    /// connections, so raw takeover is only offered for HTTP/1.1.
    pub fn supports_takeover(&self) -> bool {
        match self {
            HttpVersion::Http10 => false,
            HttpVersion::Http11 => true,
        }
    }

    pub fn to_static(&self) -> &'static str {
        match self {
            HttpVersion::Http10 => "HTTP/1.0",
            HttpVersion::Http11 => "HTTP/1.1",
        }
    }
}

impl TryFrom<u8> for HttpVersion {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Http10),
            1 => Ok(Self::Http11),
            _ => Err(value),
        }
    }
}

impl std::fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_static())
    }
}

//! Release stream definitions.

use std::fmt;

/// Release cadence a snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Minor release stream.
    Ystream,
    /// Patch release stream.
    Zstream,
}

impl Stream {
    /// Derive the stream from an application name.
    ///
    /// `ystream` takes priority when both markers appear.
    pub fn detect(application: &str) -> crate::Result<Self> {
        if application.contains("ystream") {
            Ok(Stream::Ystream)
        } else if application.contains("zstream") {
            Ok(Stream::Zstream)
        } else {
            Err(crate::Error::UnknownStream(application.to_string()))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stream::Ystream => "ystream",
            Stream::Zstream => "zstream",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

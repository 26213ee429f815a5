use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// The render request could not be parsed.
    InvalidRequest(String),
    /// The watermark image could not be decoded.
    Image(String),
    /// A custom font file could not be read or parsed.
    Font(String),
    /// No blob with this id exists in the store.
    NotFound(String),
    Pdf(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidRequest(msg) => write!(f, "Invalid render request: {msg}"),
            Error::Image(msg) => write!(f, "Watermark error: {msg}"),
            Error::Font(msg) => write!(f, "Font error: {msg}"),
            Error::NotFound(id) => write!(f, "Blob not found: {id}"),
            Error::Pdf(msg) => write!(f, "PDF error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => " (check for trailing commas or missing quotes)",
            serde_json::error::Category::Data => " (field names or types do not match the request schema)",
            serde_json::error::Category::Eof => " (input is truncated)",
            serde_json::error::Category::Io => "",
        };
        Error::InvalidRequest(format!("{e}{hint}"))
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

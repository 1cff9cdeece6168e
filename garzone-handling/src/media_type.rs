// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use phf::phf_map;
use unicase::UniCase;

use garzone_http::HeaderValue;

/// The media types this server distinguishes. Everything outside the
/// extension table below is served as plain text.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MediaType {
    Common(&'static str),
}

impl MediaType {
    pub const HTML: MediaType = MediaType::Common("text/html");
    pub const JPEG: MediaType = MediaType::Common("image/jpeg");
    pub const PLAIN_TEXT: MediaType = MediaType::Common("text/plain");

    pub fn as_str(&self) -> &'static str {
        match *self {
            MediaType::Common(s) => s,
        }
    }

    /// Returns the media type for the given extension.
    #[must_use]
    pub fn from_extension(extension: &str) -> &'static MediaType {
        MEDIA_TYPE_BY_EXTENSION.get(&UniCase::ascii(extension)).unwrap_or(&MediaType::PLAIN_TEXT)
    }

    #[must_use]
    pub fn from_path(path: &str) -> &'static MediaType {
        let extension = path.rsplit('.').next().unwrap_or("");
        MediaType::from_extension(extension)
    }
}

static MEDIA_TYPE_BY_EXTENSION: phf::Map<UniCase<&'static str>, MediaType> = phf_map!(
    UniCase::ascii("html") => MediaType::HTML,
    UniCase::ascii("jpeg") => MediaType::JPEG,
    UniCase::ascii("jpg") => MediaType::JPEG,
);

impl From<&MediaType> for HeaderValue {
    fn from(value: &MediaType) -> Self {
        match *value {
            MediaType::Common(s) => HeaderValue::StaticString(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[rstest]
    #[case("/index.html", "text/html")]
    #[case("/photos/cat.jpg", "image/jpeg")]
    #[case("/photos/cat.JPEG", "image/jpeg")]
    #[case("/readme.txt", "text/plain")]
    #[case("/no-extension", "text/plain")]
    #[case("/archive.tar.gz", "text/plain")]
    fn test_from_path(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(MediaType::from_path(path).as_str(), expected);
    }
}

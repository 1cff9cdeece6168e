// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use std::time::SystemTime;

use crate::{
    HeaderName,
    HeaderValue,
};

/// An insertion-ordered header field collection with a single value per
/// name. Serialization walks the map in insertion order, so a message
/// round-trips with its fields in the order the peer sent them.
///
/// The set of fields in one message is small, a linear scan beats hashing
/// here.
#[derive(Clone, Debug, Default)]
pub struct HeaderMap {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderMap {
    pub fn new() -> HeaderMap {
        HeaderMap::default()
    }

    /// Append a header to the list of headers, unless a field with the given
    /// `name` is already present, in which case the existing value wins.
    pub fn append(&mut self, name: HeaderName, value: HeaderValue) {
        if !self.contains(&name) {
            self.headers.push((name, value));
        }
    }

    /// Set the value for `name`, replacing an existing value in place so the
    /// field keeps its original position in the serialization order.
    pub fn append_or_override(&mut self, name: HeaderName, value: HeaderValue) {
        for (existing_name, existing_value) in &mut self.headers {
            if *existing_name == name {
                *existing_value = value;
                return;
            }
        }

        self.headers.push((name, value));
    }

    #[must_use]
    pub fn contains(&self, header_name: &HeaderName) -> bool {
        self.headers.iter().any(|(name, _)| name == header_name)
    }

    #[must_use]
    pub fn get(&self, header_name: &HeaderName) -> Option<&HeaderValue> {
        self.headers.iter()
            .find(|(name, _)| name == header_name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(name, value)| (name, value))
    }

    pub fn remove(&mut self, header_name: &HeaderName) {
        self.headers.retain(|(name, _)| name != header_name);
    }
}

//
// Header-specific methods
//
impl HeaderMap {
    pub fn set_content_length(&mut self, length: usize) {
        self.append_or_override(HeaderName::ContentLength, HeaderValue::Size(length));
    }

    pub fn set_last_modified(&mut self, date_time: SystemTime) {
        self.append_or_override(HeaderName::LastModified, HeaderValue::DateTime(date_time));
    }
}

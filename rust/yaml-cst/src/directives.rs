// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! `%YAML` and `%TAG` directives and tag handle expansion.

use ordermap::OrderMap;

use crate::document::DirectiveEntry;
use crate::options::Version;
use crate::schema::tags;

/// Directive state for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directives {
    pub version: Version,
    /// A `%YAML` directive was given.
    pub explicit_version: bool,
    /// Handle to prefix, starting with `!` and `!!`.
    pub tags: OrderMap<String, String>,
    pub entries: Vec<DirectiveEntry>,
    /// The document has a `---` marker.
    pub doc_start: bool,
    default_version: Version,
    at_next_document: bool,
}

fn default_tags() -> OrderMap<String, String> {
    OrderMap::from([
        ("!".to_owned(), "!".to_owned()),
        ("!!".to_owned(), tags::PREFIX.to_owned()),
    ])
}

impl Directives {
    #[must_use]
    pub fn new(version: Version) -> Self {
        Self {
            version,
            explicit_version: false,
            tags: default_tags(),
            entries: Vec::new(),
            doc_start: false,
            default_version: version,
            at_next_document: false,
        }
    }

    fn reset(&mut self) {
        self.version = self.default_version;
        self.explicit_version = false;
        self.tags = default_tags();
        self.entries.clear();
    }

    /// Take a snapshot for the document that starts now. Unless `carry` is
    /// set, the next document starts again from the defaults.
    pub fn at_document(&mut self, carry: bool) -> Self {
        let snapshot = self.clone();
        self.doc_start = false;
        if carry {
            self.at_next_document = false;
        } else {
            self.reset();
        }
        snapshot
    }

    /// A directive line arriving after a document begins a new prologue.
    pub fn at_next_document(&mut self, carry: bool) {
        if !carry {
            self.at_next_document = true;
        }
    }

    /// Apply one directive line (without comment). Problems are reported as
    /// `(column, message)` warnings; returns `false` if the line was ignored.
    pub fn add(&mut self, line: &str, mut on_warning: impl FnMut(usize, String)) -> bool {
        if self.at_next_document {
            self.reset();
        }
        self.at_next_document = false;

        let mut parts = line.split([' ', '\t']).filter(|part| !part.is_empty());
        let name = parts.next().unwrap_or_default();
        let parts: Vec<&str> = parts.collect();
        match name {
            "%TAG" => {
                if parts.len() != 2 {
                    on_warning(0, "%TAG directive should contain exactly two parts".to_owned());
                    if parts.len() < 2 {
                        return false;
                    }
                }
                let (handle, prefix) = (parts[0].to_owned(), parts[1].to_owned());
                self.entries.push(DirectiveEntry::Tag {
                    handle: handle.clone(),
                    prefix: prefix.clone(),
                });
                self.tags.insert(handle, prefix);
                true
            }
            "%YAML" => {
                self.explicit_version = true;
                let [version] = parts.as_slice() else {
                    on_warning(0, "%YAML directive should contain exactly one part".to_owned());
                    return false;
                };
                if let Some(version) = Version::from_str_opt(version) {
                    self.version = version;
                    self.entries.push(DirectiveEntry::Yaml { version });
                    true
                } else {
                    on_warning(6, format!("Unsupported YAML version {version}"));
                    false
                }
            }
            _ => {
                on_warning(0, format!("Unknown directive {name}"));
                false
            }
        }
    }

    /// Expand a tag token such as `!!str`, `!local`, `!e!suffix` or
    /// `!<verbatim>` to its full name. Problems go to `on_error` as
    /// `(message, is_warning)`; an undeclared handle is only a warning.
    /// `None` means the tag could not be resolved at all.
    pub fn tag_name(&self, source: &str, mut on_error: impl FnMut(String, bool)) -> Option<String> {
        if source == "!" {
            return Some("!".to_owned());
        }
        if !source.starts_with('!') {
            on_error(format!("Not a valid tag: {source}"), false);
            return None;
        }
        if let Some(rest) = source.strip_prefix("!<") {
            let verbatim = rest.strip_suffix('>').unwrap_or(rest);
            if verbatim == "!" || verbatim == "!!" {
                on_error(format!("Verbatim tags aren't resolved, so {source} is invalid."), false);
                return None;
            }
            if !source.ends_with('>') {
                on_error("Verbatim tags must end with a >".to_owned(), false);
            }
            return Some(verbatim.to_owned());
        }

        let split = source.rfind('!').map_or(0, |idx| idx + 1);
        let (handle, suffix) = source.split_at(split);
        if suffix.is_empty() {
            on_error(format!("The {source} tag has no suffix"), false);
        }
        if let Some(prefix) = self.tags.get(handle) {
            return match percent_decode(suffix) {
                Ok(suffix) => Some(format!("{prefix}{suffix}")),
                Err(err) => {
                    on_error(err, false);
                    None
                }
            };
        }
        if handle == "!" {
            return Some(source.to_owned());
        }
        on_error(format!("Could not resolve tag: {source}"), true);
        None
    }

    /// The shortest form of a full tag name under the current handles.
    #[must_use]
    pub fn tag_string(&self, tag: &str) -> String {
        for (handle, prefix) in &self.tags {
            if let Some(suffix) = tag.strip_prefix(prefix.as_str()) {
                return format!("{handle}{}", escape_tag_name(suffix));
            }
        }
        if tag.starts_with('!') {
            tag.to_owned()
        } else {
            format!("!<{tag}>")
        }
    }
}


fn escape_tag_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if matches!(ch, '!' | ',' | '[' | ']' | '{' | '}') {
            out.push_str(&format!("%{:02X}", ch as u32));
        } else {
            out.push(ch);
        }
    }
    out
}

/// Decode `%XX` escapes; the result must be valid UTF-8.
fn percent_decode(text: &str) -> Result<String, String> {
    if !text.contains('%') {
        return Ok(text.to_owned());
    }
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while let Some(&b) = bytes.get(idx) {
        if b == b'%' {
            let hex = text
                .get(idx + 1..idx + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| format!("Invalid percent escape in tag suffix {text}"))?;
            out.push(hex);
            idx += 3;
        } else {
            out.push(b);
            idx += 1;
        }
    }
    String::from_utf8(out).map_err(|_| format!("Tag suffix {text} is not valid UTF-8"))
}

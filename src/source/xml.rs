//! Reads an XML formatting-object document as a stream of markup events.

use log::trace;
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quire_tree::{EventSource, Location, MarkupEvent, TreeError};
use std::collections::VecDeque;

const FO_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Format";

/// Pulls [`MarkupEvent`]s out of XML text.
///
/// Adjacent character data (including entity and character references) is
/// delivered as one text event. Empty elements produce a start and an end
/// event. Comments, processing instructions and the prolog are skipped.
///
/// Elements in the formatting-object namespace are reported as `fo:<local>`
/// whatever prefix (or default namespace) the document binds it to.
pub struct XmlEventSource<'a> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
    buf: Vec<u8>,
    pending: VecDeque<MarkupEvent>,
    cursor: LineTracker,
    namespaces: NamespaceScopes,
    finished: bool,
}

impl<'a> XmlEventSource<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);
        Self {
            source,
            reader,
            buf: Vec::new(),
            pending: VecDeque::new(),
            cursor: LineTracker::default(),
            namespaces: NamespaceScopes::default(),
            finished: false,
        }
    }

    /// Reads raw events until one complete markup event (or a run of text
    /// followed by the event that ended it) is available in `pending`.
    fn fill(&mut self) -> Result<(), TreeError> {
        let mut text = String::new();
        let mut text_location = None;

        loop {
            let pos = self.reader.buffer_position();
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| TreeError::Source(format!("{} at byte {}", e, pos)))?;
            let location = self.cursor.advance(self.source, pos as usize);

            let element = match event {
                XmlEvent::Text(e) => {
                    let raw = std::str::from_utf8(e.as_ref())
                        .map_err(|e| TreeError::Source(e.to_string()))?;
                    let unescaped = unescape(raw).map_err(|e| TreeError::Source(e.to_string()))?;
                    text_location.get_or_insert(location);
                    text.push_str(&unescaped);
                    continue;
                }
                XmlEvent::CData(e) => {
                    let raw = std::str::from_utf8(e.as_ref())
                        .map_err(|e| TreeError::Source(e.to_string()))?;
                    text_location.get_or_insert(location);
                    text.push_str(raw);
                    continue;
                }
                XmlEvent::GeneralRef(e) => {
                    let name = std::str::from_utf8(e.as_ref())
                        .map_err(|e| TreeError::Source(e.to_string()))?;
                    text_location.get_or_insert(location);
                    if let Some(c) = e
                        .resolve_char_ref()
                        .map_err(|e| TreeError::Source(e.to_string()))?
                    {
                        text.push(c);
                    } else if let Some(s) = resolve_predefined_entity(name) {
                        text.push_str(s);
                    } else {
                        return Err(TreeError::Source(format!(
                            "unknown entity '&{};' at {}",
                            name, location
                        )));
                    }
                    continue;
                }
                XmlEvent::Start(e) => vec![start_event(&e, location, &mut self.namespaces)?],
                XmlEvent::Empty(e) => {
                    let start = start_event(&e, location, &mut self.namespaces)?;
                    let end = MarkupEvent::End {
                        tag: self.namespaces.element_tag(&tag_name(&e)?),
                        location,
                    };
                    self.namespaces.pop();
                    vec![start, end]
                }
                XmlEvent::End(e) => {
                    let name = e.name();
                    let raw = std::str::from_utf8(name.as_ref())
                        .map_err(|e| TreeError::Source(e.to_string()))?;
                    let tag = self.namespaces.element_tag(raw);
                    self.namespaces.pop();
                    vec![MarkupEvent::End { tag, location }]
                }
                XmlEvent::Eof => {
                    self.finished = true;
                    vec![MarkupEvent::EndOfStream]
                }
                _ => continue,
            };

            if !text.is_empty() {
                self.pending.push_back(MarkupEvent::Text {
                    text: std::mem::take(&mut text),
                    location: text_location.take().unwrap_or(location),
                });
            }
            self.pending.extend(element);
            return Ok(());
        }
    }
}

impl EventSource for XmlEventSource<'_> {
    fn next_event(&mut self) -> Result<MarkupEvent, TreeError> {
        if self.pending.is_empty() {
            if self.finished {
                return Ok(MarkupEvent::EndOfStream);
            }
            self.fill()?;
        }
        let event = self.pending.pop_front().unwrap_or(MarkupEvent::EndOfStream);
        trace!("[XML] {:?}", event);
        Ok(event)
    }
}

fn tag_name(e: &BytesStart<'_>) -> Result<String, TreeError> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_string)
        .map_err(|e| TreeError::Source(e.to_string()))
}

/// Reads the element's attributes, opening a namespace scope for any
/// `xmlns` declarations it carries. The caller closes the scope at the
/// element's end.
fn start_event(
    e: &BytesStart<'_>,
    location: Location,
    namespaces: &mut NamespaceScopes,
) -> Result<MarkupEvent, TreeError> {
    let mut attributes = Vec::new();
    let mut bindings = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| TreeError::Source(format!("{} at {}", err, location)))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| TreeError::Source(e.to_string()))?;
        let raw = std::str::from_utf8(&attr.value).map_err(|e| TreeError::Source(e.to_string()))?;
        let value = unescape(raw).map_err(|e| TreeError::Source(e.to_string()))?;
        if key == "xmlns" {
            bindings.push((String::new(), value.into_owned()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            bindings.push((prefix.to_string(), value.into_owned()));
        } else {
            attributes.push((key.to_string(), value.into_owned()));
        }
    }
    namespaces.push(bindings);
    Ok(MarkupEvent::Start {
        tag: namespaces.element_tag(&tag_name(e)?),
        attributes,
        location,
    })
}

/// Prefix bindings in force, one scope per open element.
#[derive(Debug, Default)]
struct NamespaceScopes {
    scopes: Vec<Vec<(String, String)>>,
}

impl NamespaceScopes {
    fn push(&mut self, bindings: Vec<(String, String)>) {
        self.scopes.push(bindings);
    }

    fn pop(&mut self) {
        self.scopes.pop();
    }

    fn lookup(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.iter().find(|(p, _)| p == prefix))
            .map(|(_, uri)| uri.as_str())
    }

    /// `qname` with its prefix replaced by `fo` when it is bound to the
    /// formatting-object namespace. Other names are returned as written.
    fn element_tag(&self, qname: &str) -> String {
        let (prefix, local) = qname.split_once(':').unwrap_or(("", qname));
        match self.lookup(prefix) {
            Some(FO_NAMESPACE) => format!("fo:{local}"),
            _ => qname.to_string(),
        }
    }
}

/// Incremental byte offset to line/column conversion. Offsets must not go
/// backwards.
#[derive(Debug, Clone, Copy)]
struct LineTracker {
    pos: usize,
    line: usize,
    col: usize,
}

impl Default for LineTracker {
    fn default() -> Self {
        Self {
            pos: 0,
            line: 1,
            col: 1,
        }
    }
}

impl LineTracker {
    fn advance(&mut self, source: &str, pos: usize) -> Location {
        let target = pos.min(source.len());
        if target > self.pos {
            for c in source[self.pos..target].chars() {
                if c == '\n' {
                    self.line += 1;
                    self.col = 1;
                } else {
                    self.col += 1;
                }
            }
            self.pos = target;
        }
        Location::from((self.line, self.col))
    }
}

//! SPDX-FileCopyrightText: 2025 CyberDeco
//!
//! SPDX-License-Identifier: MIT
//!
//! Cursor over the COLLADA event stream.
//!
//! Wraps a streaming `quick_xml::Reader` so the section parsers only ever
//! see one token at a time: a start tag with its attributes, an end tag,
//! a text chunk, or the end of the document.

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Start {
        name: String,
        attributes: Vec<(String, String)>,
    },
    End(String),
    Text(String),
    Other,
    Eof,
}

/// Forward-only cursor over the elements of an XML document.
pub struct EventCursor<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    token: Token,
}

impl<R: BufRead> EventCursor<R> {
    /// Create a cursor positioned before the first token.
    pub fn new(inner: R) -> Self {
        let mut reader = Reader::from_reader(inner);
        // Don't trim text - split text chunks are concatenated before trimming
        reader.trim_text(false);
        // `<input .../>` is reported as a start tag followed by an end tag
        reader.expand_empty_elements(true);

        Self {
            reader,
            buf: Vec::new(),
            token: Token::Other,
        }
    }

    /// Move to the next token.
    pub fn advance(&mut self) -> Result<()> {
        self.buf.clear();
        self.token = match self.reader.read_event_into(&mut self.buf)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let mut attributes = Vec::new();
                for attr in e.attributes() {
                    let attr = attr?;
                    let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                    let value = attr.unescape_value()?.into_owned();
                    attributes.push((key, value));
                }
                Token::Start { name, attributes }
            }
            Event::End(e) => Token::End(String::from_utf8_lossy(e.local_name().as_ref()).into_owned()),
            Event::Text(e) => Token::Text(e.unescape()?.into_owned()),
            Event::CData(e) => Token::Text(String::from_utf8_lossy(&e.into_inner()).into_owned()),
            Event::Eof => Token::Eof,
            _ => Token::Other,
        };
        Ok(())
    }

    /// True once the reader has run out of input.
    pub fn at_document_end(&self) -> bool {
        self.token == Token::Eof
    }

    /// True if the current token opens an element called `name`.
    pub fn is_start(&self, name: &str) -> bool {
        matches!(&self.token, Token::Start { name: current, .. } if current == name)
    }

    /// True if the current token closes an element called `name`.
    pub fn is_end(&self, name: &str) -> bool {
        matches!(&self.token, Token::End(current) if current == name)
    }

    /// Name of the element opened by the current token.
    pub fn element_name(&self) -> Option<&str> {
        match &self.token {
            Token::Start { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Optional attribute of the current start tag.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.token {
            Token::Start { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Mandatory attribute of the current start tag.
    pub fn required_attribute(&self, name: &str) -> Result<&str> {
        self.attribute(name).ok_or_else(|| Error::MissingAttribute {
            element: self.element_name().unwrap_or_default().to_string(),
            attribute: name.to_string(),
        })
    }

    /// Read all text up to the closing tag of `element`, trimmed.
    ///
    /// Text of nested elements is included, so COLLADA 1.5
    /// `<init_from><ref>file</ref></init_from>` reads the same as 1.4.
    pub fn text_content(&mut self, element: &str) -> Result<String> {
        let mut content = String::new();
        loop {
            self.advance()?;
            match &self.token {
                Token::Text(text) => content.push_str(text),
                Token::End(name) if name == element => break,
                Token::Eof => return Err(Error::truncated(element)),
                _ => {}
            }
        }
        Ok(content.trim().to_string())
    }

    /// Advance until a start tag named `name` is current.
    pub fn go_to_element(&mut self, name: &str) -> Result<()> {
        while !self.is_start(name) {
            if self.at_document_end() {
                return Err(Error::truncated(name));
            }
            self.advance()?;
        }
        Ok(())
    }

    /// Advance to the next start tag nested anywhere inside `element`.
    ///
    /// Returns the tag name, or `None` once the closing tag of `element` is
    /// reached. Running out of input first is `StreamTruncated`.
    pub fn next_start_within(&mut self, element: &str) -> Result<Option<String>> {
        loop {
            self.advance()?;
            match &self.token {
                Token::Start { name, .. } => return Ok(Some(name.clone())),
                Token::End(name) if name == element => return Ok(None),
                Token::Eof => return Err(Error::truncated(element)),
                _ => {}
            }
        }
    }

    /// Skip the current element and everything inside it.
    pub fn skip_element(&mut self, element: &str) -> Result<()> {
        let mut depth = 0usize;
        loop {
            self.advance()?;
            match &self.token {
                Token::Start { name, .. } if name == element => depth += 1,
                Token::End(name) if name == element => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                Token::Eof => return Err(Error::truncated(element)),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(xml: &str) -> EventCursor<&[u8]> {
        EventCursor::new(xml.as_bytes())
    }

    #[test]
    fn test_attributes_and_text() {
        let mut cursor = cursor(r#"<root><float_array id="a" count="3"> 1 2
 3 </float_array></root>"#);
        cursor.go_to_element("float_array").unwrap();
        assert_eq!(cursor.attribute("count"), Some("3"));
        assert_eq!(cursor.attribute("missing"), None);
        assert_eq!(cursor.text_content("float_array").unwrap(), "1 2\n 3");
        assert!(cursor.is_end("float_array"));
    }

    #[test]
    fn test_missing_attribute() {
        let mut cursor = cursor(r#"<root><source/></root>"#);
        cursor.go_to_element("source").unwrap();
        let err = cursor.required_attribute("id").unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAttribute { ref element, ref attribute } if element == "source" && attribute == "id"
        ));
    }

    #[test]
    fn test_empty_elements_are_expanded() {
        let mut cursor = cursor(r#"<mesh><input semantic="VERTEX"/><p>0</p></mesh>"#);
        cursor.go_to_element("mesh").unwrap();
        assert_eq!(cursor.next_start_within("mesh").unwrap().as_deref(), Some("input"));
        assert_eq!(cursor.next_start_within("mesh").unwrap().as_deref(), Some("p"));
        assert_eq!(cursor.text_content("p").unwrap(), "0");
        assert_eq!(cursor.next_start_within("mesh").unwrap(), None);
    }

    #[test]
    fn test_truncated_document() {
        let mut cursor = cursor(r#"<mesh><source id="a">"#);
        cursor.go_to_element("mesh").unwrap();
        cursor.next_start_within("mesh").unwrap();
        let err = cursor.next_start_within("mesh").unwrap_err();
        assert!(matches!(err, Error::StreamTruncated { ref element } if element == "mesh"));
    }

    #[test]
    fn test_skip_nested_element() {
        let mut cursor = cursor(r#"<a><b><b/><c/></b><d/></a>"#);
        cursor.go_to_element("b").unwrap();
        cursor.skip_element("b").unwrap();
        assert_eq!(cursor.next_start_within("a").unwrap().as_deref(), Some("d"));
    }
}

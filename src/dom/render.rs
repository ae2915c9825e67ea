//! Markup rendering
//!
//! Writes a subtree back out as XML, forcing it as it goes. Namespace
//! declarations come first, then attributes, both in source order. Values
//! are single-quoted unless they contain `'` and no `"`; a value holding
//! both quote kinds gets `'` written as `&apos;`. Apart from that, text and
//! values are written as-is, so `&` and `<` are not escaped and a decoded
//! entity such as `&lt;` does not survive a round trip.

use super::node::{Element, Node, Text};
use crate::error::Result;
use std::fmt::{self, Write};

impl Node {
    /// Write this subtree to `out`, forcing it
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        match self {
            Node::Element(e) => e.write_to(out),
            Node::Text(t) => t.write_to(out),
        }
    }

    /// Render this subtree to a string, forcing it
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}

impl Element {
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        let name = self.name();
        write!(out, "<{}", name)?;
        for (prefix, uri) in self.namespace_bindings() {
            if prefix.is_empty() {
                write_pair(out, "xmlns", uri)?;
            } else {
                write_pair(out, &format!("xmlns:{}", prefix), uri)?;
            }
        }
        for (key, value) in self.attributes() {
            write_pair(out, key, value)?;
        }

        if self.children().is_empty()? {
            self.end_of_span()?;
            out.write_str("/>")?;
            return Ok(());
        }
        out.write_char('>')?;
        for child in self.children() {
            child?.write_to(out)?;
        }
        // the closing tag must really be there
        self.end_of_span()?;
        write!(out, "</{}>", name)?;
        Ok(())
    }

    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}

impl Text {
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_str(self.content())?;
        Ok(())
    }
}

/// ` key='value'`, switching to double quotes when that keeps the value intact
fn write_pair<W: Write>(out: &mut W, key: &str, value: &str) -> fmt::Result {
    match (value.contains('\''), value.contains('"')) {
        (false, _) => write!(out, " {}='{}'", key, value),
        (true, false) => write!(out, " {}=\"{}\"", key, value),
        (true, true) => write!(out, " {}='{}'", key, value.replace('\'', "&apos;")),
    }
}

// A subtree that fails to materialize surfaces as `fmt::Error`; use
// `render` to see the underlying error.

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f).map_err(|_| fmt::Error)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f).map_err(|_| fmt::Error)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::stream::EventStream;
    use crate::error::Error;
    use crate::reader::events::{Event, StartElement};
    use crate::reader::source::IterSource;
    use std::sync::Arc;

    fn root(events: Vec<Event>) -> Element {
        let stream = Arc::new(EventStream::new(IterSource::new(events.into_iter().map(Ok))));
        Element::parse(&stream, 0).unwrap()
    }

    #[test]
    fn test_empty_element_self_closes() {
        let a = root(vec![Event::start("a"), Event::ElementEnd, Event::StreamEnd]);
        assert_eq!(a.render().unwrap(), "<a/>");
    }

    #[test]
    fn test_bindings_before_attributes() {
        let start = StartElement::new("a")
            .with_namespace("urn:p", Some("p"))
            .with_binding("", "urn:d")
            .with_binding("p", "urn:p")
            .with_attribute("x", "1")
            .with_attribute("p:y", "a&b");
        let a = root(vec![
            Event::ElementStart(start),
            Event::text("t"),
            Event::start("b"),
            Event::ElementEnd,
            Event::ElementEnd,
            Event::StreamEnd,
        ]);
        assert_eq!(
            a.to_string(),
            "<p:a xmlns='urn:d' xmlns:p='urn:p' x='1' p:y='a&b'>t<b/></p:a>"
        );
    }

    #[test]
    fn test_value_quoting() {
        let start = StartElement::new("a")
            .with_attribute("plain", "x<y & z")
            .with_attribute("apos", "it's")
            .with_attribute("both", "say \"it's\"");
        let a = root(vec![Event::ElementStart(start), Event::ElementEnd, Event::StreamEnd]);
        assert_eq!(
            a.render().unwrap(),
            "<a plain='x<y & z' apos=\"it's\" both='say \"it&apos;s\"'/>"
        );
    }

    #[test]
    fn test_render_reports_forcing_failure() {
        let a = root(vec![Event::start("a"), Event::text("t"), Event::StreamEnd]);
        assert!(matches!(a.render(), Err(Error::UnexpectedEvent { .. })));
        let mut out = String::new();
        assert!(fmt::write(&mut out, format_args!("{}", a)).is_err());
    }
}

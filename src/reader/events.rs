//! XML Event Types
//!
//! The four-variant event vocabulary the lazy tree is built from.

use std::fmt;

/// Pull-parser event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Opening tag of an element (empty tags produce a start and an end)
    ElementStart(StartElement),
    /// Closing tag of the innermost open element
    ElementEnd,
    /// Character data, CDATA included
    Text(String),
    /// End of the document; always the last event
    StreamEnd,
}

/// Payload of an element-start event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartElement {
    /// Resolved namespace URI, if the element is in a namespace
    pub namespace_uri: Option<String>,
    /// Lexical prefix, if the element name carried one
    pub prefix: Option<String>,
    /// Local name (after colon)
    pub local_name: String,
    /// Namespace declarations on this tag, prefix -> URI, in source order.
    /// The default namespace uses the empty prefix.
    pub namespace_bindings: Vec<(String, String)>,
    /// Attributes, qualified name -> value, in source order.
    /// Never contains `xmlns` declarations.
    pub attributes: Vec<(String, String)>,
}

impl StartElement {
    /// Start element with no namespace, bindings, or attributes
    pub fn new(local_name: impl Into<String>) -> Self {
        StartElement {
            local_name: local_name.into(),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, uri: impl Into<String>, prefix: Option<&str>) -> Self {
        self.namespace_uri = Some(uri.into());
        self.prefix = prefix.map(str::to_owned);
        self
    }

    pub fn with_binding(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespace_bindings.push((prefix.into(), uri.into()));
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Lexical name: `prefix:local` or `local`
    pub fn name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }
}

impl Event {
    /// Shorthand for a text event
    pub fn text(content: impl Into<String>) -> Self {
        Event::Text(content.into())
    }

    /// Shorthand for a start event with no namespace or attributes
    pub fn start(local_name: impl Into<String>) -> Self {
        Event::ElementStart(StartElement::new(local_name))
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::ElementStart(_) => EventKind::ElementStart,
            Event::ElementEnd => EventKind::ElementEnd,
            Event::Text(_) => EventKind::Text,
            Event::StreamEnd => EventKind::StreamEnd,
        }
    }

    pub fn as_start_element(&self) -> Option<&StartElement> {
        match self {
            Event::ElementStart(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Event::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Event discriminant, used in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ElementStart,
    ElementEnd,
    Text,
    StreamEnd,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventKind::ElementStart => "element start",
            EventKind::ElementEnd => "element end",
            EventKind::Text => "text",
            EventKind::StreamEnd => "stream end",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_element_name() {
        let plain = StartElement::new("div");
        assert_eq!(plain.name(), "div");

        let prefixed = StartElement::new("rect").with_namespace("http://www.w3.org/2000/svg", Some("svg"));
        assert_eq!(prefixed.name(), "svg:rect");
        assert_eq!(prefixed.namespace_uri.as_deref(), Some("http://www.w3.org/2000/svg"));
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(Event::start("a").kind(), EventKind::ElementStart);
        assert_eq!(Event::text("x").as_text(), Some("x"));
        assert_eq!(Event::ElementEnd.kind().to_string(), "element end");
    }
}

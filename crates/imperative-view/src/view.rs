use std::fmt;

use indexmap::IndexMap;

/// Retained output of a render pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum View {
    Element(Element),
    Text(String),
    Fragment(Vec<View>),
    #[default]
    Empty,
}

impl View {
    pub fn element(tag: impl Into<String>) -> Element {
        Element::new(tag)
    }

    pub fn text(text: impl Into<String>) -> View {
        View::Text(text.into())
    }

    pub fn fragment(children: impl IntoIterator<Item = View>) -> View {
        View::Fragment(children.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            View::Empty => true,
            View::Fragment(children) => children.iter().all(View::is_empty),
            _ => false,
        }
    }

    /// Concatenated text of the whole subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            View::Element(element) => element
                .children
                .iter()
                .for_each(|child| child.collect_text(out)),
            View::Text(text) => out.push_str(text),
            View::Fragment(children) => children.iter().for_each(|child| child.collect_text(out)),
            View::Empty => {}
        }
    }

    /// Depth-first search for the first element with `tag`.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        match self {
            View::Element(element) if element.tag == tag => Some(element),
            View::Element(element) => element.children.iter().find_map(|child| child.find(tag)),
            View::Fragment(children) => children.iter().find_map(|child| child.find(tag)),
            _ => None,
        }
    }
}

impl From<Element> for View {
    fn from(element: Element) -> Self {
        View::Element(element)
    }
}

impl From<&str> for View {
    fn from(text: &str) -> Self {
        View::text(text)
    }
}

impl From<String> for View {
    fn from(text: String) -> Self {
        View::Text(text)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<View>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: impl Into<View>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = View>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Element(element) => fmt::Display::fmt(element, f),
            View::Text(text) => f.write_str(text),
            View::Fragment(children) => children
                .iter()
                .try_for_each(|child| fmt::Display::fmt(child, f)),
            View::Empty => Ok(()),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            write!(f, " {name}=\"{value}\"")?;
        }
        f.write_str(">")?;
        for child in &self.children {
            fmt::Display::fmt(child, f)?;
        }
        write!(f, "</{}>", self.tag)
    }
}

//! Document XML minimal construit avec quick-xml
//!
//! Seuls les noms locaux sont conservés: `kml:Placemark` et `Placemark`
//! sont équivalents, avec ou sans namespace KML déclaré.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::GeometryError;

/// Document XML stocké à plat, dans l'ordre du document
///
/// Les descendants d'un nœud occupent les indices `id + 1 .. end`, ce qui
/// évite toute récursion (parcours comme libération) quelle que soit la
/// profondeur d'imbrication.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    tag: String,
    text: String,
    end: usize,
}

impl Document {
    /// Élément racine (un document parsé en a toujours un)
    pub fn root(&self) -> Element<'_> {
        Element { doc: self, id: 0 }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Référence vers un élément du document
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    doc: &'a Document,
    id: usize,
}

impl<'a> Element<'a> {
    fn node(self) -> &'a Node {
        &self.doc.nodes[self.id]
    }

    /// Nom local
    pub fn tag(self) -> &'a str {
        &self.node().tag
    }

    /// Texte concaténé (texte et CDATA)
    pub fn text(self) -> &'a str {
        &self.node().text
    }

    fn descendants(self) -> impl Iterator<Item = Element<'a>> {
        let doc = self.doc;
        (self.id + 1..self.node().end).map(move |id| Element { doc, id })
    }

    /// Premier descendant portant ce nom (profondeur d'abord, ordre du document)
    pub fn find(self, tag: &str) -> Option<Element<'a>> {
        self.descendants().find(|e| e.tag() == tag)
    }

    /// Tous les descendants portant ce nom, dans l'ordre du document
    pub fn find_all(self, tag: &str) -> Vec<Element<'a>> {
        self.descendants().filter(|e| e.tag() == tag).collect()
    }

    /// Texte sans blancs en bordure, `None` si vide
    pub fn trimmed_text(self) -> Option<&'a str> {
        let text = self.text().trim();
        (!text.is_empty()).then_some(text)
    }
}

/// Parse un document XML complet
///
/// `origin` sert uniquement au message d'erreur.
pub fn parse(content: &str, origin: &str) -> Result<Document, GeometryError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut nodes: Vec<Node> = Vec::new();
    // Indices des éléments ouverts
    let mut open: Vec<usize> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            GeometryError::malformed(
                origin,
                format!("{} at byte {}", e, reader.buffer_position()),
            )
        })?;

        match event {
            Event::Start(start) => {
                let id = push_node(&mut nodes, &open, &start, origin)?;
                open.push(id);
            }
            Event::Empty(start) => {
                let id = push_node(&mut nodes, &open, &start, origin)?;
                nodes[id].end = id + 1;
            }
            Event::End(_) => {
                let Some(id) = open.pop() else {
                    return Err(GeometryError::malformed(origin, "unexpected closing tag"));
                };
                nodes[id].end = nodes.len();
            }
            Event::Text(text) => {
                let unescaped = text
                    .unescape()
                    .map_err(|e| GeometryError::malformed(origin, e.to_string()))?;
                append_text(&mut nodes, &open, &unescaped, origin)?;
            }
            Event::CData(data) => {
                let raw = data.into_inner();
                append_text(&mut nodes, &open, &String::from_utf8_lossy(&raw), origin)?;
            }
            Event::Eof => break,
            // Déclaration, commentaires, DOCTYPE, PI
            _ => {}
        }
    }

    if let Some(&id) = open.last() {
        return Err(GeometryError::malformed(
            origin,
            format!("unclosed element <{}>", nodes[id].tag),
        ));
    }
    if nodes.is_empty() {
        return Err(GeometryError::malformed(origin, "no root element"));
    }

    Ok(Document { nodes })
}

fn push_node(
    nodes: &mut Vec<Node>,
    open: &[usize],
    start: &BytesStart,
    origin: &str,
) -> Result<usize, GeometryError> {
    if open.is_empty() && !nodes.is_empty() {
        return Err(GeometryError::malformed(origin, "multiple root elements"));
    }
    let id = nodes.len();
    nodes.push(Node {
        tag: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        text: String::new(),
        end: id + 1,
    });
    Ok(id)
}

fn append_text(
    nodes: &mut [Node],
    open: &[usize],
    text: &str,
    origin: &str,
) -> Result<(), GeometryError> {
    let Some(&id) = open.last() else {
        return Err(GeometryError::malformed(origin, "text outside root element"));
    };
    let current = &mut nodes[id].text;
    if !current.is_empty() {
        current.push(' ');
    }
    current.push_str(text);
    Ok(())
}

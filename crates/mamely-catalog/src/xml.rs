//! `MAMEly.xml` reading and writing
//!
//! ```xml
//! <menu>
//!   <header>...</header>
//!   <game name="pacman">
//!     <description>Pac-Man</description>
//!     <genre>Maze</genre>
//!     <rating>General</rating>
//!     <favorite>0</favorite>
//!     <ignore>0</ignore>
//!   </game>
//! </menu>
//! ```

use crate::{CatalogError, GameRecord};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io;
use std::path::Path;

pub(crate) const LIST_NAME: &str = "MAMEly";

/// A `<game>` node as it appears in the file, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CatalogEntry {
    pub id: String,
    pub description: String,
    pub genre: String,
    pub rating: String,
    pub favorite: bool,
    pub ignore: bool,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Description,
    Genre,
    Rating,
    Favorite,
    Ignore,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"description" => Some(Field::Description),
            b"genre" => Some(Field::Genre),
            b"rating" => Some(Field::Rating),
            b"favorite" => Some(Field::Favorite),
            b"ignore" => Some(Field::Ignore),
            _ => None,
        }
    }
}

impl CatalogEntry {
    fn set(&mut self, field: Field, text: &str) {
        match field {
            Field::Description => self.description.push_str(text),
            Field::Genre => self.genre.push_str(text),
            Field::Rating => self.rating.push_str(text),
            Field::Favorite => self.favorite = parse_flag(text),
            Field::Ignore => self.ignore = parse_flag(text),
        }
    }
}

/// `0`/`1` flag; anything unparsable counts as `0`
fn parse_flag(text: &str) -> bool {
    text.trim().parse::<i64>().map(|v| v != 0).unwrap_or(false)
}

fn game_name(start: &BytesStart) -> Result<String, String> {
    let attr = start
        .try_get_attribute("name")
        .map_err(|e| e.to_string())?;

    match attr {
        Some(attr) => attr
            .unescape_value()
            .map(|v| v.trim().to_string())
            .map_err(|e| e.to_string()),
        None => Ok(String::new()),
    }
}

/// Parse catalog text into raw entries, in document order.
///
/// Any well-formedness problem is fatal: no partial entry list is returned.
pub(crate) fn parse_catalog(path: &Path, xml: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    let malformed = |reason: String| CatalogError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current: Option<CatalogEntry> = None;
    let mut field: Option<Field> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            malformed(format!("{} (at byte {})", e, reader.buffer_position()))
        })?;

        match event {
            Event::Eof => break,
            Event::Start(start) => {
                if depth == 0 {
                    if seen_root {
                        return Err(malformed("more than one root element".to_string()));
                    }
                    seen_root = true;
                }
                depth += 1;

                match depth {
                    2 if start.name().as_ref() == b"game" => {
                        let id = game_name(&start).map_err(&malformed)?;
                        current = Some(CatalogEntry {
                            id,
                            ..Default::default()
                        });
                    }
                    3 if current.is_some() => field = Field::from_tag(start.name().as_ref()),
                    _ => {}
                }
            }
            Event::Empty(start) => {
                if depth == 0 {
                    if seen_root {
                        return Err(malformed("more than one root element".to_string()));
                    }
                    seen_root = true;
                } else if depth == 1 && start.name().as_ref() == b"game" {
                    let id = game_name(&start).map_err(&malformed)?;
                    entries.push(CatalogEntry {
                        id,
                        ..Default::default()
                    });
                }
            }
            Event::End(end) => {
                match depth {
                    3 => field = None,
                    2 if end.name().as_ref() == b"game" => {
                        if let Some(entry) = current.take() {
                            entries.push(entry);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| malformed(e.to_string()))?;
                if depth == 0 {
                    return Err(malformed(format!("text outside root element: {text:?}")));
                }
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    entry.set(field, &text);
                }
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    entry.set(field, &text);
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(malformed("unexpected end of file inside an element".to_string()));
    }
    if !seen_root {
        return Err(malformed("no root element".to_string()));
    }

    Ok(entries)
}

fn text_element<W: io::Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))
}

fn flag_text(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Render records as catalog XML.
///
/// Returns the document and the number of `<game>` nodes written; records
/// with an empty id cannot be addressed and are left out.
pub(crate) fn render_catalog<'a>(
    records: impl IntoIterator<Item = &'a GameRecord>,
    generated_at: &str,
    generator: &str,
) -> io::Result<(Vec<u8>, usize)> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let mut written = 0;

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    writer.write_event(Event::Start(BytesStart::new("menu")))?;

    writer.write_event(Event::Start(BytesStart::new("header")))?;
    text_element(&mut writer, "listname", LIST_NAME)?;
    text_element(&mut writer, "lastlistupdate", generated_at)?;
    text_element(&mut writer, "listgeneratorversion", generator)?;
    writer.write_event(Event::End(BytesEnd::new("header")))?;

    for record in records {
        if record.id.is_empty() {
            tracing::warn!("Not writing game without an id ({})", record.display_name);
            continue;
        }

        let mut game = BytesStart::new("game");
        game.push_attribute(("name", record.id.as_str()));
        writer.write_event(Event::Start(game))?;
        text_element(&mut writer, "description", &record.display_name)?;
        text_element(&mut writer, "genre", &record.genre)?;
        text_element(&mut writer, "rating", &record.rating)?;
        text_element(&mut writer, "favorite", flag_text(record.favorite))?;
        text_element(&mut writer, "ignore", flag_text(record.ignore))?;
        writer.write_event(Event::End(BytesEnd::new("game")))?;
        written += 1;
    }

    writer.write_event(Event::End(BytesEnd::new("menu")))?;

    let mut document = writer.into_inner();
    document.push(b'\n');
    Ok((document, written))
}

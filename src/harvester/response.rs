use quick_xml::{
    escape::resolve_predefined_entity,
    events::{BytesRef, BytesStart, Event},
    name::{Namespace, ResolveResult},
    reader::NsReader,
};

use crate::harvester::oai::OAI_NAMESPACE;

/// What one `ListRecords` response told us.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListRecordsPage {
    /// Text of the first `resumptionToken` element, `None` when there was none.
    pub resumption_token: Option<String>,
    pub complete_list_size: Option<u64>,
    pub cursor: Option<u64>,
    pub records: usize,
    pub error: Option<OaiError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OaiError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    ResumptionToken,
    Error,
}

#[derive(Debug)]
struct Capture {
    target: Target,
    depth: usize,
    text: String,
}

/// Scans a whole response body. The body has to be well-formed XML even
/// after the token has been found.
pub fn parse_list_records(xml: &str) -> anyhow::Result<ListRecordsPage> {
    let mut reader = NsReader::from_str(xml);
    let mut page = ListRecordsPage::default();
    let mut capture: Option<Capture> = None;
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let in_oai = matches!(ns, ResolveResult::Bound(Namespace(ns)) if ns == OAI_NAMESPACE.as_bytes());

        match event {
            Event::Start(e) => {
                if depth == 0 && seen_root {
                    anyhow::bail!("document has more than one root element");
                }
                seen_root = true;
                if in_oai && let Some(target) = page.visit(&e, capture.is_some(), false)? {
                    capture = Some(Capture {
                        target,
                        depth,
                        text: String::new(),
                    });
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 0 && seen_root {
                    anyhow::bail!("document has more than one root element");
                }
                seen_root = true;
                if in_oai {
                    page.visit(&e, capture.is_some(), true)?;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if let Some(done) = capture.take_if(|c| c.depth == depth) {
                    page.finish(done);
                }
            }
            Event::Text(e) => {
                let text = e.decode()?;
                if depth == 0 && !text.trim().is_empty() {
                    anyhow::bail!("text outside of the root element");
                }
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if depth == 0 {
                    anyhow::bail!("CDATA outside of the root element");
                }
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&e.decode()?);
                }
            }
            Event::GeneralRef(e) => {
                if depth == 0 {
                    anyhow::bail!("entity reference outside of the root element");
                }
                let resolved = resolve_reference(&e)?;
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        anyhow::bail!("document has no root element");
    }
    if depth != 0 {
        anyhow::bail!("document ended with {depth} unclosed element(s)");
    }

    Ok(page)
}

impl ListRecordsPage {
    /// Records what an OAI element tells us. Returns the capture to start when
    /// the element's text is needed.
    fn visit(
        &mut self,
        element: &BytesStart<'_>,
        capturing: bool,
        empty: bool,
    ) -> anyhow::Result<Option<Target>> {
        match element.local_name().as_ref() {
            b"record" => {
                self.records += 1;
                Ok(None)
            }
            b"resumptionToken" if !capturing && self.resumption_token.is_none() => {
                self.complete_list_size = numeric_attribute(element, "completeListSize")?;
                self.cursor = numeric_attribute(element, "cursor")?;
                if empty {
                    self.resumption_token = Some(String::new());
                    return Ok(None);
                }
                Ok(Some(Target::ResumptionToken))
            }
            b"error" if !capturing && self.error.is_none() => {
                let code = element
                    .try_get_attribute("code")?
                    .map(|attr| attr.unescape_value().map(|v| v.into_owned()))
                    .transpose()?
                    .unwrap_or_default();
                self.error = Some(OaiError {
                    code,
                    message: String::new(),
                });
                if empty {
                    return Ok(None);
                }
                Ok(Some(Target::Error))
            }
            _ => Ok(None),
        }
    }

    fn finish(&mut self, capture: Capture) {
        match capture.target {
            Target::ResumptionToken => self.resumption_token = Some(capture.text),
            Target::Error => {
                if let Some(error) = self.error.as_mut() {
                    error.message = capture.text.trim().to_string();
                }
            }
        }
    }
}

fn numeric_attribute(element: &BytesStart<'_>, name: &str) -> anyhow::Result<Option<u64>> {
    Ok(element
        .try_get_attribute(name)?
        .map(|attr| attr.unescape_value().map(|v| v.trim().parse::<u64>().ok()))
        .transpose()?
        .flatten())
}

fn resolve_reference(reference: &BytesRef<'_>) -> anyhow::Result<String> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(ch.to_string());
    }

    let name = reference.decode()?;
    match resolve_predefined_entity(&name) {
        Some(value) => Ok(value.to_string()),
        None => anyhow::bail!("unknown entity reference &{name};"),
    }
}

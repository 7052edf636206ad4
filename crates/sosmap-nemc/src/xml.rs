//! data.go.kr XML envelope parsing.
//!
//! Every feed wraps its payload in the same envelope:
//! `response/header/{resultCode,resultMsg}` and `response/body/items/item*`.
//! Item element names vary per feed, so each `<item>` is collected as a
//! flat tag-to-text map and typed one layer up.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Debug, Default)]
pub(crate) struct Envelope {
    pub result_code: Option<String>,
    pub result_msg: Option<String>,
    pub total_count: Option<u32>,
    pub items: Vec<BTreeMap<String, String>>,
}

pub(crate) fn parse_envelope(body: &str) -> Result<Envelope, quick_xml::Error> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut envelope = Envelope::default();
    let mut in_item = false;
    let mut current_item: BTreeMap<String, String> = BTreeMap::new();
    let mut current_tag = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_owned();
                if name == "item" {
                    in_item = true;
                    current_item.clear();
                } else {
                    current_tag = name;
                }
            }
            Event::End(e) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "item" && in_item {
                    in_item = false;
                    envelope.items.push(std::mem::take(&mut current_item));
                }
                current_tag.clear();
            }
            Event::Text(e) => {
                let text = e.unescape().unwrap_or_default().into_owned();
                record_text(&mut envelope, in_item, &mut current_item, &current_tag, text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                record_text(&mut envelope, in_item, &mut current_item, &current_tag, text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(envelope)
}

fn record_text(
    envelope: &mut Envelope,
    in_item: bool,
    current_item: &mut BTreeMap<String, String>,
    current_tag: &str,
    text: String,
) {
    if text.is_empty() || current_tag.is_empty() {
        return;
    }
    if in_item {
        current_item.insert(current_tag.to_owned(), text);
    } else {
        match current_tag {
            "resultCode" => envelope.result_code = Some(text),
            "resultMsg" => envelope.result_msg = Some(text),
            "totalCount" => envelope.total_count = text.parse().ok(),
            _ => {}
        }
    }
}

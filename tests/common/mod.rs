#![allow(dead_code)]

pub mod pages;

use form_replay::browser::session::LivePage;
use form_replay::dom::dom_model::{Document, NodeId, PageFixture};
use serde_json::Value;

pub fn page_from(fixture: Value) -> LivePage {
    let fixture: PageFixture = serde_json::from_value(fixture).expect("valid page fixture");
    LivePage::new(Document::from_fixture(fixture))
}

/// Node carrying the given id attribute.
pub fn node(page: &LivePage, id: &str) -> NodeId {
    page.read(|doc| doc.element_by_id(id).unwrap())
        .unwrap_or_else(|| panic!("no element #{}", id))
}

pub fn value_of(page: &LivePage, id: &str) -> String {
    let n = node(page, id);
    page.read(|doc| doc.node(n).unwrap().value.clone())
}

pub fn checked(page: &LivePage, id: &str) -> bool {
    let n = node(page, id);
    page.read(|doc| doc.node(n).unwrap().checked)
}

/// (value, checked) of every input, textarea and select, in document order.
pub fn control_state(page: &LivePage) -> Vec<(String, bool)> {
    page.read(|doc| {
        let mut out = Vec::new();
        for tag in ["input", "textarea", "select"] {
            for n in doc.elements_by_tag(tag) {
                let el = doc.node(n).unwrap();
                out.push((el.value.clone(), el.checked));
            }
        }
        out
    })
}

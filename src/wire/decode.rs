//! XML request decoding.
//!
//! The body is read into a small element tree first and the request fields
//! are picked out of that. Attributes, comments, declarations, processing
//! instructions, doctypes and CDATA sections never contribute a value.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::error::DecodeError;
use crate::verification::{PortOutRequest, TelephoneNumberEntry};

/// Root element of an inbound request.
pub const REQUEST_ROOT: &str = "PortOutValidationRequest";

/// An element with its trimmed direct text and child elements.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn named(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    /// The child called `name` when there is exactly one. A repeated
    /// single-valued field is as good as missing.
    fn single_child(&self, name: &str) -> Option<&Element> {
        let mut matches = self.children.iter().filter(|child| child.name == name);
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    fn leaf_text(&self, name: &str) -> Option<String> {
        self.single_child(name).map(|child| child.text.clone())
    }
}

/// Decode a request body.
///
/// `Ok(None)` means the document parsed but holds no single
/// `PortOutValidationRequest` element. `Err` means it is not well-formed XML.
pub fn decode_request(body: &str) -> Result<Option<PortOutRequest>, DecodeError> {
    let roots = parse_elements(body)?;

    let mut candidates = roots.iter().filter(|root| root.name == REQUEST_ROOT);
    let root = match (candidates.next(), candidates.next()) {
        (Some(root), None) => root,
        _ => {
            debug!(roots = roots.len(), "No single request element in body");
            return Ok(None);
        }
    };

    let telephone_numbers = root
        .single_child("TelephoneNumbers")
        .map(|numbers| {
            numbers
                .children
                .iter()
                .filter(|child| child.name == "TelephoneNumber")
                .map(|child| TelephoneNumberEntry {
                    raw: Some(child.text.clone()),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Some(PortOutRequest {
        account_number: root.leaf_text("AccountNumber"),
        pin: root.leaf_text("Pin"),
        zip_code: root.leaf_text("ZipCode"),
        subscriber_name: root.leaf_text("SubscriberName"),
        telephone_numbers,
    }))
}

/// Decode raw body bytes, rejecting anything that is not UTF-8.
pub fn decode_request_bytes(body: &[u8]) -> Result<Option<PortOutRequest>, DecodeError> {
    let Ok(text) = std::str::from_utf8(body) else {
        return Err(DecodeError::InvalidUtf8);
    };
    decode_request(text)
}

/// Build the top-level elements of a document.
fn parse_elements(body: &str) -> Result<Vec<Element>, DecodeError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut roots = Vec::new();
    let mut open: Vec<Element> = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                let position = reader.buffer_position();
                return Err(DecodeError::Malformed(format!("at byte {position}: {e}")));
            }
        };

        match event {
            Event::Start(start) => open.push(Element::named(start.name().as_ref())),
            Event::Empty(start) => {
                let element = Element::named(start.name().as_ref());
                attach(&mut open, &mut roots, element);
            }
            Event::End(_) => {
                // Mismatched end tags are rejected by the reader
                if let Some(element) = open.pop() {
                    attach(&mut open, &mut roots, element);
                }
            }
            Event::Text(text) => {
                if let Some(current) = open.last_mut() {
                    let value = text
                        .unescape()
                        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
                    current.text.push_str(value.trim());
                }
            }
            Event::Eof => break,
            // CDATA, comments, declarations, PIs and doctypes carry no values
            _ => {}
        }
    }

    if let Some(unclosed) = open.pop() {
        return Err(DecodeError::UnclosedElement(unclosed.name));
    }

    Ok(roots)
}

fn attach(open: &mut [Element], roots: &mut Vec<Element>, element: Element) {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None => roots.push(element),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(xml: &str) -> PortOutRequest {
        decode_request(xml).unwrap().expect("request element")
    }

    #[test]
    fn decodes_full_request() {
        let request = decode(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <PortOutValidationRequest>
              <AccountNumber>A1</AccountNumber>
              <Pin>1234</Pin>
              <ZipCode>90210</ZipCode>
              <SubscriberName>Jane Doe</SubscriberName>
              <TelephoneNumbers>
                <TelephoneNumber>5551234567</TelephoneNumber>
                <TelephoneNumber>5559876543</TelephoneNumber>
              </TelephoneNumbers>
            </PortOutValidationRequest>"#,
        );

        assert_eq!(request.account_number.as_deref(), Some("A1"));
        assert_eq!(request.pin.as_deref(), Some("1234"));
        assert_eq!(request.zip_code.as_deref(), Some("90210"));
        assert_eq!(request.subscriber_name.as_deref(), Some("Jane Doe"));
        assert_eq!(
            request.telephone_number_values(),
            vec!["5551234567".to_string(), "5559876543".to_string()]
        );
    }

    #[test]
    fn single_telephone_number() {
        let request = decode(
            "<PortOutValidationRequest><TelephoneNumbers>\
             <TelephoneNumber>5551234567</TelephoneNumber>\
             </TelephoneNumbers></PortOutValidationRequest>",
        );
        assert_eq!(
            request.telephone_numbers,
            vec![TelephoneNumberEntry::new("5551234567")]
        );
        assert!(request.account_number.is_none());
    }

    #[test]
    fn missing_fields_stay_none() {
        let request = decode("<PortOutValidationRequest/>");
        assert_eq!(request, PortOutRequest::default());
    }

    #[test]
    fn empty_elements_are_empty_strings() {
        let request = decode(
            "<PortOutValidationRequest><Pin/><ZipCode>   </ZipCode>\
             <TelephoneNumbers><TelephoneNumber/></TelephoneNumbers>\
             </PortOutValidationRequest>",
        );
        assert_eq!(request.pin.as_deref(), Some(""));
        assert_eq!(request.zip_code.as_deref(), Some(""));
        assert_eq!(request.telephone_numbers.len(), 1);
        assert_eq!(request.telephone_numbers[0].value(), "");
    }

    #[test]
    fn attributes_and_comments_are_ignored() {
        let request = decode(
            r#"<PortOutValidationRequest xmlns="urn:example">
                 <!-- account -->
                 <AccountNumber type="primary">A1</AccountNumber>
                 <Pin><!-- secret -->1234</Pin>
               </PortOutValidationRequest>"#,
        );
        assert_eq!(request.account_number.as_deref(), Some("A1"));
        assert_eq!(request.pin.as_deref(), Some("1234"));
    }

    #[test]
    fn cdata_contributes_nothing() {
        let request = decode(
            "<PortOutValidationRequest><Pin><![CDATA[1234]]></Pin></PortOutValidationRequest>",
        );
        assert_eq!(request.pin.as_deref(), Some(""));
    }

    #[test]
    fn entities_are_unescaped() {
        let request = decode(
            "<PortOutValidationRequest>\
             <SubscriberName>Smith &amp; Sons</SubscriberName>\
             </PortOutValidationRequest>",
        );
        assert_eq!(request.subscriber_name.as_deref(), Some("Smith & Sons"));
    }

    #[test]
    fn repeated_single_field_is_treated_as_missing() {
        let request = decode(
            "<PortOutValidationRequest><Pin>1</Pin><Pin>2</Pin></PortOutValidationRequest>",
        );
        assert!(request.pin.is_none());
    }

    #[test]
    fn repeated_number_lists_are_treated_as_missing() {
        let request = decode(
            "<PortOutValidationRequest>\
             <TelephoneNumbers><TelephoneNumber>5551234567</TelephoneNumber></TelephoneNumbers>\
             <TelephoneNumbers><TelephoneNumber>5559876543</TelephoneNumber></TelephoneNumbers>\
             </PortOutValidationRequest>",
        );
        assert!(request.telephone_numbers.is_empty());
    }

    #[test]
    fn wrong_root_is_none() {
        let xml = "<SomethingElse><Pin>1</Pin></SomethingElse>";
        assert!(decode_request(xml).unwrap().is_none());
        assert!(decode_request("").unwrap().is_none());
    }

    #[test]
    fn malformed_xml_is_error() {
        let xml = "<PortOutValidationRequest><Pin>1</Zip></PortOutValidationRequest>";
        assert!(matches!(
            decode_request(xml),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn unclosed_root_is_error() {
        let xml = "<PortOutValidationRequest><Pin>1</Pin>";
        assert!(decode_request(xml).is_err());
    }

    #[test]
    fn non_utf8_bytes_are_rejected() {
        assert!(matches!(
            decode_request_bytes(&[0x3c, 0xff, 0xfe, 0x3e]),
            Err(DecodeError::InvalidUtf8)
        ));
    }
}

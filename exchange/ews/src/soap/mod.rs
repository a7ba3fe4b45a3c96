/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::io::Read;

use const_format::concatcp;
use quick_xml::{
    escape::escape,
    events::{BytesStart, Event},
    Reader,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    error::{Error, UnmarshalError},
    types::{MESSAGES_NS_URI, SOAP_NS_URI, TYPES_NS_URI},
    xml::{fragment_writer, XmlElement, XmlRoot},
};

mod header;
pub use header::{
    ConnectingSid, ExchangeImpersonation, Header, RequestServerVersion, ResponseHeader,
    ServerVersionInfo, TimeZoneContext, TimeZoneDefinition, UnknownVersion, Version,
};

/// Everything preceding the SOAP header: the XML declaration and the
/// envelope start tag declaring the prefixes used by requests.
pub const SOAP_START: &str = concatcp!(
    r#"<?xml version="1.0" encoding="utf-8"?>"#,
    r#"<soap:Envelope xmlns:soap=""#,
    SOAP_NS_URI,
    r#"" xmlns:t=""#,
    TYPES_NS_URI,
    r#"" xmlns:m=""#,
    MESSAGES_NS_URI,
    r#"">"#
);

pub const SOAP_BODY_START: &str = "<soap:Body>";

pub const SOAP_END: &str = "</soap:Body></soap:Envelope>";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes a complete SOAP request document into `buf`.
pub fn write_envelope<B: XmlRoot>(
    buf: &mut Vec<u8>,
    header: &Header,
    body: &B,
) -> Result<(), Error> {
    buf.extend_from_slice(SOAP_START.as_bytes());
    header.write_as_element(&mut fragment_writer(&mut *buf), "soap:Header")?;

    buf.extend_from_slice(SOAP_BODY_START.as_bytes());
    body.write_as_root(&mut fragment_writer(&mut *buf))?;

    buf.extend_from_slice(SOAP_END.as_bytes());

    Ok(())
}

/// A namespace declaration, e.g. `xmlns:t="…"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Namespace {
    /// The declaring attribute, `xmlns` or `xmlns:prefix`.
    pub attribute: String,
    pub uri: String,
}

/// The outer structure of a SOAP response.
///
/// Parsing only locates the header and body; their contents are kept as
/// verbatim slices of the document and decoded on demand.
#[derive(Clone, Debug)]
pub struct ResponseEnvelope<'a> {
    body_namespaces: Vec<Namespace>,
    header_namespaces: Vec<Namespace>,
    header: Option<&'a [u8]>,
    body: &'a [u8],
}

impl<'a> ResponseEnvelope<'a> {
    pub fn parse(document: &'a [u8]) -> Result<Self, UnmarshalError> {
        // The reader skips a byte order mark, which would shift every span
        // relative to `document`.
        let document = document.strip_prefix(UTF8_BOM).unwrap_or(document);
        let mut reader = Reader::from_reader(document);

        let envelope_namespaces = loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    expect_envelope(&start)?;

                    break namespace_declarations(&start)?;
                }

                Event::Empty(start) => {
                    expect_envelope(&start)?;

                    return Err(UnmarshalError::MissingBody);
                }

                Event::End(end) => {
                    return Err(UnmarshalError::NotAnEnvelope(
                        String::from_utf8_lossy(end.name().as_ref()).into_owned(),
                    ))
                }

                Event::Text(text) if !text.iter().all(u8::is_ascii_whitespace) => {
                    let text = String::from_utf8_lossy(&text);

                    return Err(UnmarshalError::NotAnEnvelope(
                        text.trim().chars().take(32).collect(),
                    ));
                }

                Event::Eof => return Err(UnmarshalError::Empty),

                // Prolog: declaration, comments, whitespace.
                _ => {}
            }
        };

        let mut header = None;
        let mut body = None;
        loop {
            let (start, contents) = match reader.read_event()? {
                Event::Start(start) => {
                    let span = reader.read_to_end(start.name())?;
                    let contents = &document[span.start as usize..span.end as usize];

                    (start, contents)
                }

                Event::Empty(start) => (start, &document[..0]),

                Event::End(_) => break,
                Event::Eof => return Err(UnmarshalError::UnexpectedEof),
                _ => continue,
            };

            let slot = match start.local_name().as_ref() {
                b"Header" => &mut header,
                b"Body" => &mut body,
                _ => continue,
            };

            let mut namespaces = envelope_namespaces.clone();
            for namespace in namespace_declarations(&start)? {
                declare(&mut namespaces, namespace);
            }

            *slot = Some((contents, namespaces));
        }

        let (body, body_namespaces) = body.ok_or(UnmarshalError::MissingBody)?;
        let (header, header_namespaces) = match header {
            Some((header, namespaces)) => (Some(header), namespaces),
            None => (None, Vec::new()),
        };

        Ok(Self {
            body_namespaces,
            header_namespaces,
            header,
            body,
        })
    }

    /// The verbatim contents of `soap:Body`.
    pub fn body(&self) -> &'a [u8] {
        self.body
    }

    /// The verbatim contents of `soap:Header`, if the response had one.
    pub fn raw_header(&self) -> Option<&'a [u8]> {
        self.header
    }

    /// Namespace declarations in scope inside the body.
    pub fn body_namespaces(&self) -> &[Namespace] {
        &self.body_namespaces
    }

    pub fn header(&self) -> Result<Option<ResponseHeader>, UnmarshalError> {
        match self.header {
            Some(header) => decode_scoped(&self.header_namespaces, header).map(Some),
            None => Ok(None),
        }
    }

    /// Decodes the single element inside `soap:Body`.
    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T, UnmarshalError> {
        #[derive(Deserialize)]
        struct BodyContents<T> {
            #[serde(rename = "$value")]
            inner: T,
        }

        let contents: BodyContents<T> = decode_scoped(&self.body_namespaces, self.body)?;

        Ok(contents.inner)
    }
}

fn expect_envelope(start: &BytesStart<'_>) -> Result<(), UnmarshalError> {
    if start.local_name().as_ref() == b"Envelope" {
        Ok(())
    } else {
        Err(UnmarshalError::NotAnEnvelope(
            String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        ))
    }
}

fn namespace_declarations(start: &BytesStart<'_>) -> Result<Vec<Namespace>, quick_xml::Error> {
    let mut namespaces = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute?;

        let key = attribute.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            namespaces.push(Namespace {
                attribute: String::from_utf8_lossy(key).into_owned(),
                uri: attribute.unescape_value()?.into_owned(),
            });
        }
    }

    Ok(namespaces)
}

/// Adds a declaration, replacing any earlier one for the same prefix.
fn declare(namespaces: &mut Vec<Namespace>, namespace: Namespace) {
    match namespaces
        .iter_mut()
        .find(|existing| existing.attribute == namespace.attribute)
    {
        Some(existing) => existing.uri = namespace.uri,
        None => namespaces.push(namespace),
    }
}

/// Decodes a fragment cut out of a larger document.
///
/// The fragment is wrapped in a `Scope` element re-declaring the namespaces
/// which were in scope where it was cut, so that prefixed names still
/// resolve.
fn decode_scoped<T: DeserializeOwned>(
    namespaces: &[Namespace],
    fragment: &[u8],
) -> Result<T, UnmarshalError> {
    let mut open = String::from("<Scope");
    for namespace in namespaces {
        open.push(' ');
        open.push_str(&namespace.attribute);
        open.push_str("=\"");
        open.push_str(&escape(namespace.uri.as_str()));
        open.push('"');
    }
    open.push('>');

    let document = open
        .as_bytes()
        .chain(fragment)
        .chain(&b"</Scope>"[..]);

    Ok(serde_xml_rs::from_reader(document)?)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::{write_envelope, Header, ResponseEnvelope, Version, SOAP_END, SOAP_START};
    use crate::{error::UnmarshalError, xml::XmlElement};

    #[derive(XmlElement)]
    #[xml_serialize(ns_prefix = "m", child_ns_prefix = "m")]
    struct Ping {
        #[xml_serialize(is_attribute)]
        count: u32,
        text: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "PascalCase")]
    struct PingResponse {
        response_code: String,
        echo: String,
    }

    const RESPONSE: &str = concat!(
        r#"<?xml version="1.0" encoding="utf-8"?>"#,
        r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">"#,
        r#"<s:Header><h:ServerVersionInfo MajorVersion="15" MinorVersion="1" "#,
        r#"MajorBuildNumber="2507" MinorBuildNumber="6" Version="V2017_07_11" "#,
        r#"xmlns:h="http://schemas.microsoft.com/exchange/services/2006/types"/></s:Header>"#,
        r#"<s:Body xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages">"#,
        r#"<m:PingResponse><m:ResponseCode>NoError</m:ResponseCode>"#,
        r#"<m:Echo>hello</m:Echo></m:PingResponse>"#,
        r#"</s:Body></s:Envelope>"#,
    );

    #[test]
    fn test_write_envelope() {
        let mut buf = Vec::new();
        write_envelope(
            &mut buf,
            &Header::new(Version::Exchange2013_SP1),
            &Ping {
                count: 2,
                text: "hello".to_string(),
            },
        )
        .unwrap();

        let expected = format!(
            concat!(
                "{}",
                r#"<soap:Header><t:RequestServerVersion Version="Exchange2013_SP1" /></soap:Header>"#,
                r#"<soap:Body><m:Ping Count="2"><m:Text>hello</m:Text></m:Ping>"#,
                "{}"
            ),
            SOAP_START, SOAP_END
        );

        assert_eq!(std::str::from_utf8(&buf).unwrap(), expected);
    }

    #[test]
    fn test_envelope_preamble() {
        assert_eq!(
            SOAP_START,
            concat!(
                r#"<?xml version="1.0" encoding="utf-8"?><soap:Envelope "#,
                r#"xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" "#,
                r#"xmlns:t="http://schemas.microsoft.com/exchange/services/2006/types" "#,
                r#"xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages">"#,
            )
        );
        assert_eq!(SOAP_END, "</soap:Body></soap:Envelope>");
    }

    #[test]
    fn test_parse_response() {
        let envelope = ResponseEnvelope::parse(RESPONSE.as_bytes()).unwrap();

        assert!(std::str::from_utf8(envelope.body())
            .unwrap()
            .starts_with("<m:PingResponse>"));

        let response: PingResponse = envelope.decode_body().unwrap();
        assert_eq!(
            response,
            PingResponse {
                response_code: "NoError".to_string(),
                echo: "hello".to_string(),
            }
        );

        let info = envelope
            .header()
            .unwrap()
            .and_then(|header| header.server_version_info)
            .expect("header should carry server version info");
        assert_eq!(info.major_version, Some(15));
        assert_eq!(info.minor_build_number, Some(6));
        assert_eq!(info.version.as_deref(), Some("V2017_07_11"));
    }

    #[test]
    fn test_parse_with_byte_order_mark() {
        let mut document = "\u{feff}".as_bytes().to_vec();
        document.extend_from_slice(RESPONSE.as_bytes());

        let envelope = ResponseEnvelope::parse(&document).unwrap();
        let plain = ResponseEnvelope::parse(RESPONSE.as_bytes()).unwrap();

        assert_eq!(envelope.body(), plain.body());
        assert_eq!(envelope.raw_header(), plain.raw_header());

        let response: PingResponse = envelope.decode_body().unwrap();
        assert_eq!(response.echo, "hello");
    }

    #[test]
    fn test_body_keeps_outer_namespaces() {
        let envelope = ResponseEnvelope::parse(RESPONSE.as_bytes()).unwrap();

        let attributes: Vec<_> = envelope
            .body_namespaces()
            .iter()
            .map(|namespace| namespace.attribute.as_str())
            .collect();
        assert_eq!(attributes, ["xmlns:s", "xmlns:m"]);
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(
            ResponseEnvelope::parse(b"<html><body>Gateway</body></html>"),
            Err(UnmarshalError::NotAnEnvelope(name)) if name == "html"
        ));

        assert!(matches!(
            ResponseEnvelope::parse(b""),
            Err(UnmarshalError::Empty)
        ));

        assert!(matches!(
            ResponseEnvelope::parse(b"  \r\n"),
            Err(UnmarshalError::Empty)
        ));

        assert!(matches!(
            ResponseEnvelope::parse(b"not xml at all"),
            Err(UnmarshalError::NotAnEnvelope(text)) if text == "not xml at all"
        ));

        assert!(matches!(
            ResponseEnvelope::parse(
                br#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Header/></s:Envelope>"#
            ),
            Err(UnmarshalError::MissingBody)
        ));

        assert!(matches!(
            ResponseEnvelope::parse(
                br#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">"#
            ),
            Err(UnmarshalError::UnexpectedEof | UnmarshalError::Envelope(_))
        ));
    }

    #[test]
    fn test_malformed_payload() {
        let envelope = ResponseEnvelope::parse(
            concat!(
                r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">"#,
                r#"<s:Body><Unexpected/></s:Body></s:Envelope>"#,
            )
            .as_bytes(),
        )
        .unwrap();

        assert!(matches!(
            envelope.decode_body::<PingResponse>(),
            Err(UnmarshalError::Payload(_))
        ));
    }
}

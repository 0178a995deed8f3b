//! XML response encoding.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::EncodeError;
use crate::verification::{ReasonCode, VerificationOutcome};

/// Root element of an outbound response.
pub const RESPONSE_ROOT: &str = "PortOutValidationResponse";

/// Description attached to every error item.
pub const ERROR_DESCRIPTION: &str = "bad request";

/// Served when encoding itself fails, so the caller still gets a verdict.
pub const FALLBACK_FAILURE_BODY: &str = "<PortOutValidationResponse>
  <Portable>false</Portable>
  <Errors>
    <Error>
      <Code>7598</Code>
      <Description>bad request</Description>
    </Error>
  </Errors>
</PortOutValidationResponse>";

/// Render a verdict as the response body.
pub fn encode_outcome(outcome: &VerificationOutcome) -> Result<String, EncodeError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    open(&mut writer, RESPONSE_ROOT)?;
    match outcome {
        VerificationOutcome::Pass => leaf(&mut writer, "Portable", "true")?,
        VerificationOutcome::Fail(reason) => {
            leaf(&mut writer, "Portable", "false")?;
            write_errors(&mut writer, *reason)?;
        }
    }
    close(&mut writer, RESPONSE_ROOT)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| EncodeError::Write(e.to_string()))
}

fn write_errors(writer: &mut Writer<Vec<u8>>, reason: ReasonCode) -> Result<(), EncodeError> {
    open(writer, "Errors")?;
    open(writer, "Error")?;
    leaf(writer, "Code", &reason.code().to_string())?;
    leaf(writer, "Description", ERROR_DESCRIPTION)?;
    close(writer, "Error")?;
    close(writer, "Errors")
}

fn open(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), EncodeError> {
    emit(writer, Event::Start(BytesStart::new(name)))
}

fn close(writer: &mut Writer<Vec<u8>>, name: &str) -> Result<(), EncodeError> {
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn leaf(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), EncodeError> {
    open(writer, name)?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    close(writer, name)
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), EncodeError> {
    writer
        .write_event(event)
        .map_err(|e| EncodeError::Write(e.to_string()))
}

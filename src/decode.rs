use tracing::debug;

/// Leading bytes before the label region: report ID, length byte and the
/// three symbology identifier bytes.
const LABEL_OFFSET: usize = 5;

/// Trailing terminator bytes on every HID POS report.
const TERMINATOR_LEN: usize = 3;

/// A single decoded-scan report, delivered while the device is enabled and
/// decode mode is on. Transient: consumed immediately by [`decode`].
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct ScanEvent {
    /// Pre-decoded label bytes; absent when the report carries no label.
    pub label: Option<Vec<u8>>,

    /// Symbology identifier of the scanned barcode.
    pub symbology: [u8; 3],
}

impl ScanEvent {
    /// Parses a raw HID POS report: report ID, label length byte, symbology
    /// identifier at bytes 2..=4, the label, then a three byte terminator.
    /// Input reports come padded to the fixed report size, so the label
    /// region is bounded by the length byte, not the report tail. Reports
    /// too short to carry those fields yield `None` and are dropped.
    pub fn parse(report: &[u8]) -> Option<ScanEvent> {
        if report.len() < LABEL_OFFSET + TERMINATOR_LEN {
            debug!("Dropping {} byte report, too short for HID POS framing", report.len());
            return None;
        }

        let mut symbology = [0u8; 3];
        symbology.copy_from_slice(&report[2..=4]);

        let declared_end = LABEL_OFFSET + report[1] as usize;
        let label_bytes = if declared_end + TERMINATOR_LEN <= report.len() {
            &report[LABEL_OFFSET..declared_end]
        } else {
            // Length byte disagrees with the report size; fall back to the
            // framing and take everything up to the terminator.
            &report[LABEL_OFFSET..report.len() - TERMINATOR_LEN]
        };
        let label = if label_bytes.is_empty() {
            None
        } else {
            Some(label_bytes.to_vec())
        };

        Some(ScanEvent { label, symbology })
    }
}

/// Extracts the text label from a scan report.
///
/// Returns `None` when the report carries no label or when the label bytes
/// are not valid UTF-8. Both cases are a no-op for the caller, never an
/// error: the report is dropped silently.
pub fn decode(event: ScanEvent) -> Option<String> {
    let label = event.label?;
    match String::from_utf8(label) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!("Dropping scan report with malformed label bytes: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(label: &[u8]) -> Vec<u8> {
        let mut report = vec![0x02, label.len() as u8, 0x42, 0x31, 0x00];
        report.extend_from_slice(label);
        report.extend_from_slice(&[0x0d, 0x00, 0x00]);
        report
    }

    #[test]
    fn label_bytes_become_text() {
        let event = ScanEvent::parse(&report(b"01BB2-99999")).unwrap();
        assert_eq!(event.symbology, [0x42, 0x31, 0x00]);
        assert_eq!(decode(event), Some("01BB2-99999".to_string()));
    }

    #[test]
    fn report_without_label_decodes_to_nothing() {
        let event = ScanEvent::parse(&report(b"")).unwrap();
        assert_eq!(event.label, None);
        assert_eq!(decode(event), None);
    }

    #[test]
    fn malformed_label_bytes_decode_to_nothing() {
        let event = ScanEvent::parse(&report(&[0xff, 0xfe, 0x01])).unwrap();
        assert_eq!(decode(event), None);
    }

    #[test]
    fn truncated_report_is_dropped() {
        assert_eq!(ScanEvent::parse(&[0x02, 0x00, 0x42]), None);
    }

    #[test]
    fn padded_report_label_is_bounded_by_the_length_byte() {
        let mut padded = report(b"01BB2-00042");
        padded.resize(64, 0x00);

        let event = ScanEvent::parse(&padded).unwrap();
        assert_eq!(decode(event), Some("01BB2-00042".to_string()));
    }

    #[test]
    fn bogus_length_byte_falls_back_to_the_report_framing() {
        let mut report = report(b"01BB2-00042");
        // Claims a label longer than the report can hold.
        report[1] = 0xff;

        let event = ScanEvent::parse(&report).unwrap();
        assert_eq!(decode(event), Some("01BB2-00042".to_string()));
    }
}

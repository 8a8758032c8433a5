use super::{Document, ExportError, Exporter, ResultReport};

/// Writes a report as pretty-printed JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export(
        &self,
        report: &ResultReport,
    ) -> Result<Document, ExportError> {
        let bytes =
            serde_json::to_vec_pretty(report).map_err(|e| ExportError::Json(e.to_string()))?;
        Ok(Document {
            file_name: report.file_name("json"),
            media_type: "application/json",
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    use super::*;
    use crate::export::test_support::vat_report;
    use crate::format::Locale;

    #[test]
    fn json_document_carries_the_report() {
        let document = JsonExporter.export(&vat_report(Locale::En)).unwrap();
        let value: Value = serde_json::from_slice(&document.bytes).unwrap();

        assert_eq!(document.file_name, "calcolatore-iva-20250101-120000.json");
        assert_eq!(value["slug"], "calcolatore-iva");
        assert_eq!(value["locale"], "en");
        assert_eq!(value["outputs"][2]["value"], "€122.00");
        assert_eq!(value["chart"]["points"].as_array().map(Vec::len), Some(2));
    }
}

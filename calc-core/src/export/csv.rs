use super::{Document, ExportError, Exporter, ReportLine, ResultReport};

/// Writes a report as `section,id,label,value` rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn export(
        &self,
        report: &ResultReport,
    ) -> Result<Document, ExportError> {
        let mut writer = ::csv::Writer::from_writer(Vec::new());
        let csv_err = |e: ::csv::Error| ExportError::Csv(e.to_string());

        writer
            .write_record(["section", "id", "label", "value"])
            .map_err(csv_err)?;

        let generated_at = report.generated_at.to_rfc3339();
        for (id, value) in [
            ("slug", report.slug.as_str()),
            ("title", report.title.as_str()),
            ("locale", report.locale.as_str()),
            ("generated_at", generated_at.as_str()),
        ] {
            writer
                .write_record(["meta", id, id, value])
                .map_err(csv_err)?;
        }

        write_lines(&mut writer, "input", &report.inputs).map_err(csv_err)?;
        write_lines(&mut writer, "output", &report.outputs).map_err(csv_err)?;

        for (index, point) in report.chart.points.iter().enumerate() {
            writer
                .write_record([
                    "chart",
                    index.to_string().as_str(),
                    point.label.as_str(),
                    point.value.normalize().to_string().as_str(),
                ])
                .map_err(csv_err)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Csv(e.to_string()))?;

        Ok(Document {
            file_name: report.file_name("csv"),
            media_type: "text/csv",
            bytes,
        })
    }
}

fn write_lines(
    writer: &mut ::csv::Writer<Vec<u8>>,
    section: &str,
    lines: &[ReportLine],
) -> Result<(), ::csv::Error> {
    for line in lines {
        writer.write_record([
            section,
            line.id.as_str(),
            line.label.as_str(),
            line.value.as_str(),
        ])?;
    }
    Ok(())
}

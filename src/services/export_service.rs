use crate::error::Result;
use crate::models::absence::Absence;
use crate::models::clock_record::ClockRecord;
use chrono::{NaiveDate, NaiveTime};
use rust_xlsxwriter::*;

pub struct ExportService;

impl ExportService {
    fn fmt_time(time: Option<NaiveTime>) -> String {
        time.map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    fn fmt_minutes(minutes: Option<i32>) -> String {
        match minutes {
            Some(m) => format!("{:02}:{:02}", m / 60, m % 60),
            None => "-".to_string(),
        }
    }

    /// Generate a styled XLSX timesheet for a date range: one sheet of clock
    /// records, one of absences.
    pub fn generate_timesheet_xlsx(
        records: &[ClockRecord],
        absences: &[Absence],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();

        let header_bg = Color::RGB(0x0F172A);
        let header_text = Color::White;
        let alt_row = Color::RGB(0xF8FAFC);
        let border_color = Color::RGB(0xE2E8F0);
        let approved_color = Color::RGB(0x10B981);
        let rejected_color = Color::RGB(0xEF4444);
        let pending_color = Color::RGB(0xF59E0B);

        let title_format = Format::new()
            .set_font_size(14)
            .set_bold()
            .set_font_color(header_text)
            .set_background_color(header_bg)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);
        let header_format = Format::new()
            .set_bold()
            .set_font_color(header_text)
            .set_background_color(header_bg)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        // ── Clock records sheet ──
        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name("Timesheet")?;

            let columns = [
                ("Email", 30.0),
                ("Date", 12.0),
                ("Entry", 9.0),
                ("Lunch start", 11.0),
                ("Lunch end", 11.0),
                ("Exit", 9.0),
                ("HTP start", 10.0),
                ("HTP end", 10.0),
                ("Lunch", 9.0),
                ("Worked", 9.0),
            ];
            for (i, (_, width)) in columns.iter().enumerate() {
                worksheet.set_column_width(i as u16, *width)?;
            }

            worksheet.set_row_height(0, 32)?;
            worksheet.merge_range(
                0,
                0,
                0,
                (columns.len() - 1) as u16,
                &format!("Timesheet {} - {}", from, to),
                &title_format,
            )?;
            for (i, (label, _)) in columns.iter().enumerate() {
                worksheet.write_with_format(1, i as u16, *label, &header_format)?;
            }

            for (idx, record) in records.iter().enumerate() {
                let row = (idx + 2) as u32;
                let mut row_format = Format::new()
                    .set_border(FormatBorder::Thin)
                    .set_border_color(border_color);
                if idx % 2 == 0 {
                    row_format = row_format.set_background_color(alt_row);
                }
                worksheet.write_with_format(row, 0, &record.user_email, &row_format)?;
                worksheet.write_with_format(row, 1, record.date.to_string(), &row_format)?;
                worksheet.write_with_format(row, 2, Self::fmt_time(record.entry_time), &row_format)?;
                worksheet.write_with_format(row, 3, Self::fmt_time(record.lunch_start), &row_format)?;
                worksheet.write_with_format(row, 4, Self::fmt_time(record.lunch_end), &row_format)?;
                worksheet.write_with_format(row, 5, Self::fmt_time(record.exit_time), &row_format)?;
                worksheet.write_with_format(row, 6, Self::fmt_time(record.htp_start), &row_format)?;
                worksheet.write_with_format(row, 7, Self::fmt_time(record.htp_end), &row_format)?;
                worksheet.write_with_format(row, 8, Self::fmt_minutes(record.lunch_minutes), &row_format)?;
                worksheet.write_with_format(row, 9, Self::fmt_minutes(record.worked_minutes), &row_format)?;
            }
        }

        // ── Absences sheet ──
        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name("Absences")?;

            let columns = [
                ("Email", 30.0),
                ("Date", 12.0),
                ("Type", 12.0),
                ("Justification", 50.0),
                ("Status", 12.0),
                ("Reviewed by", 30.0),
            ];
            for (i, (_, width)) in columns.iter().enumerate() {
                worksheet.set_column_width(i as u16, *width)?;
            }
            for (i, (label, _)) in columns.iter().enumerate() {
                worksheet.write_with_format(0, i as u16, *label, &header_format)?;
            }

            for (idx, absence) in absences.iter().enumerate() {
                let row = (idx + 1) as u32;
                let status_color = match absence.status.as_str() {
                    "aprovada" => approved_color,
                    "rejeitada" => rejected_color,
                    _ => pending_color,
                };
                let status_format = Format::new()
                    .set_bold()
                    .set_font_color(status_color)
                    .set_border(FormatBorder::Thin)
                    .set_border_color(border_color);
                let row_format = Format::new()
                    .set_border(FormatBorder::Thin)
                    .set_border_color(border_color);

                worksheet.write_with_format(row, 0, &absence.user_email, &row_format)?;
                worksheet.write_with_format(row, 1, absence.date.to_string(), &row_format)?;
                worksheet.write_with_format(row, 2, &absence.tipo, &row_format)?;
                worksheet.write_with_format(row, 3, &absence.justificativa, &row_format)?;
                worksheet.write_with_format(row, 4, &absence.status, &status_format)?;
                worksheet.write_with_format(
                    row,
                    5,
                    absence.reviewed_by.as_deref().unwrap_or("-"),
                    &row_format,
                )?;
            }
        }

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}

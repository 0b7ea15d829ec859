use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::{
    domain::BusinessRecord,
    error::{Result, ScrapeError},
};

const CSV_HEADER: &str = "Name,Website,Phone,Region";

pub fn csv_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

/// Every field is double quoted. Commas are stripped from names only;
/// website and phone are written as they are.
pub fn render_csv(records: &[BusinessRecord]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');

    for record in records {
        csv.push_str(&format!(
            "\"{}\",\"{}\",\"{}\",\"{}\"\n",
            record.name.replace(',', ""),
            record.website.as_deref().unwrap_or(""),
            record.phone.as_deref().unwrap_or(""),
            record.region
        ));
    }

    csv
}

pub async fn write_csv(
    output_dir: &Path,
    file_name: &str,
    records: &[BusinessRecord],
) -> Result<PathBuf> {
    let path = output_dir.join(file_name);

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|source| ScrapeError::FileWrite {
            path: output_dir.to_path_buf(),
            source,
        })?;

    tokio::fs::write(&path, render_csv(records))
        .await
        .map_err(|source| ScrapeError::FileWrite {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

pub fn log_business_listing(records: &[BusinessRecord]) {
    log::info!("Businesses found:");
    for (index, business) in records.iter().enumerate() {
        log::info!("--- Business {} ---", index + 1);
        log::info!("Name: {}", business.name);
        log::info!("Website: {}", business.website.as_deref().unwrap_or("N/A"));
        log::info!("Phone: {}", business.phone.as_deref().unwrap_or("N/A"));
        log::info!("Region: {}", business.region);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::{csv_file_name, render_csv, write_csv};
    use crate::domain::BusinessRecord;

    fn record(name: &str, website: Option<&str>, phone: Option<&str>) -> BusinessRecord {
        BusinessRecord {
            name: name.to_string(),
            website: website.map(|w| w.to_string()),
            phone: phone.map(|p| p.to_string()),
            region: "Leeds".to_string(),
        }
    }

    #[test]
    fn file_name_is_date_stamped() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();

        assert_eq!(
            csv_file_name("property_management_companies", date),
            "property_management_companies_2024-03-07.csv"
        );
    }

    #[test]
    fn renders_header_and_quoted_rows() {
        let csv = render_csv(&[
            record("Acme, Lettings", Some("https://acme.example/"), Some("0113 496 0000")),
            record("Brook Estates", None, None),
        ]);

        assert_eq!(
            csv,
            "Name,Website,Phone,Region\n\
             \"Acme Lettings\",\"https://acme.example/\",\"0113 496 0000\",\"Leeds\"\n\
             \"Brook Estates\",\"\",\"\",\"Leeds\"\n"
        );
    }

    #[test]
    fn only_names_lose_commas() {
        let csv = render_csv(&[record(
            "A, B",
            Some("https://x.example/?a=1,2"),
            Some("01,02"),
        )]);

        assert!(csv.ends_with("\"A B\",\"https://x.example/?a=1,2\",\"01,02\",\"Leeds\"\n"));
    }

    #[test]
    fn empty_result_is_just_the_header() {
        assert_eq!(render_csv(&[]), "Name,Website,Phone,Region\n");
    }

    #[tokio::test]
    async fn writes_file_into_output_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("output");

        let path = write_csv(&dir, "out.csv", &[record("Acme", None, None)])
            .await
            .unwrap();

        assert_eq!(path, dir.join("out.csv"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
    }
}
